//! Hash-based random edge placement.

use super::IngressStrategy;
use crate::partitioning::error::IngressError;
use crate::partitioning::hashing::edge_hash;
use crate::partitioning::PartitionId;
use std::hash::Hash;

/// `pid = hash(source, target) mod num_procs`.
#[derive(Clone, Debug)]
pub struct RandomIngress {
    num_procs: usize,
}

impl RandomIngress {
    pub fn new(num_procs: usize) -> Result<Self, IngressError> {
        if num_procs == 0 {
            return Err(IngressError::InvalidNumProcs(num_procs));
        }
        Ok(Self { num_procs })
    }

    /// The placement rule, usable without an instance.
    #[inline]
    pub fn pid_of<V: Hash + ?Sized>(source: &V, target: &V, num_procs: usize) -> PartitionId {
        (edge_hash(source, target) % num_procs as u64) as PartitionId
    }
}

impl<V: Hash> IngressStrategy<V> for RandomIngress {
    fn num_procs(&self) -> usize {
        self.num_procs
    }

    fn compute_pid(&mut self, source: &V, target: &V) -> Result<PartitionId, IngressError> {
        Ok(Self::pid_of(source, target, self.num_procs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_and_in_range() {
        let mut a = RandomIngress::new(5).unwrap();
        let mut b = RandomIngress::new(5).unwrap();
        let edges: Vec<(u32, u32)> = (0..200).map(|i| (i, (i * 7 + 3) % 50)).collect();
        let forward: Vec<_> = edges.iter().map(|(s, t)| a.compute_pid(s, t).unwrap()).collect();
        let backward: Vec<_> = edges
            .iter()
            .rev()
            .map(|(s, t)| b.compute_pid(s, t).unwrap())
            .collect();
        assert!(forward.iter().all(|&p| p < 5));
        assert_eq!(forward, backward.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn single_partition() {
        let mut s = RandomIngress::new(1).unwrap();
        assert_eq!(s.compute_pid(&"x", &"y").unwrap(), 0);
    }

    #[test]
    fn zero_partitions_rejected() {
        assert!(RandomIngress::new(0).is_err());
    }
}
