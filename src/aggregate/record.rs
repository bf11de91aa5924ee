//! Vertex records and their partially-folded accumulators.

use super::fragment::EdgeTouch;
use super::merge::PayloadMerge;
use crate::partitioning::partition_set::PartitionSet;
use crate::partitioning::PartitionId;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Final per-vertex metadata: one owner, the mirrors, and global degrees.
///
/// `owner` is never in `mirrors`; `mirrors ∪ {owner}` is exactly the set of
/// partitions that touched the vertex (or a single random owner for a vertex
/// no edge touched).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexRecord<V, P> {
    pub vertex: V,
    pub owner: PartitionId,
    /// Ascending.
    pub mirrors: Vec<PartitionId>,
    pub in_edges: u64,
    pub out_edges: u64,
    pub payload: Option<P>,
}

impl<V, P> VertexRecord<V, P> {
    /// Owner followed by mirrors.
    pub fn hosts(&self) -> impl Iterator<Item = PartitionId> + '_ {
        std::iter::once(self.owner).chain(self.mirrors.iter().copied())
    }

    pub fn is_mirrored_on(&self, p: PartitionId) -> bool {
        self.mirrors.binary_search(&p).is_ok()
    }

    pub fn num_replicas(&self) -> usize {
        self.mirrors.len() + 1
    }
}

/// Commutative, associative accumulator for one vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialVertexRecord<P> {
    pub hosts: PartitionSet,
    pub in_edges: u64,
    pub out_edges: u64,
    pub payload: Option<P>,
}

/// Both sides carried a payload and the merge policy refused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unmergeable;

impl<P> PartialVertexRecord<P> {
    pub fn empty(num_procs: usize) -> Self {
        Self {
            hosts: PartitionSet::new(num_procs),
            in_edges: 0,
            out_edges: 0,
            payload: None,
        }
    }

    pub fn absorb_touch<V>(&mut self, touch: &EdgeTouch<V>) {
        self.hosts.insert(touch.partition);
        self.in_edges += touch.in_delta;
        self.out_edges += touch.out_delta;
    }

    /// Adds `payload`, merging with any payload already held. On refusal the
    /// held payload stays and `payload` is dropped.
    pub fn absorb_payload<M: PayloadMerge<P>>(
        &mut self,
        payload: P,
        merger: &M,
    ) -> Result<(), Unmergeable> {
        let Some(existing) = self.payload.take() else {
            self.payload = Some(payload);
            return Ok(());
        };
        match merger.merge(existing, payload) {
            Ok(merged) => {
                self.payload = Some(merged);
                Ok(())
            }
            Err(existing) => {
                self.payload = Some(existing);
                Err(Unmergeable)
            }
        }
    }

    /// Folds `other` into `self`. Hosts and degrees are always folded; only the
    /// payload of `other` can be refused.
    pub fn combine<M: PayloadMerge<P>>(
        &mut self,
        other: PartialVertexRecord<P>,
        merger: &M,
    ) -> Result<(), Unmergeable> {
        self.hosts.union_with(&other.hosts);
        self.in_edges += other.in_edges;
        self.out_edges += other.out_edges;
        match other.payload {
            Some(p) => self.absorb_payload(p, merger),
            None => Ok(()),
        }
    }

    /// Elects an owner uniformly from the hosting set (or from all `num_procs`
    /// partitions if nothing touched the vertex) and emits the record.
    pub fn elect<V, R: Rng>(self, vertex: V, num_procs: usize, rng: &mut R) -> VertexRecord<V, P> {
        let n_hosts = self.hosts.len();
        let (owner, mirrors) = if n_hosts == 0 {
            (rng.gen_range(0..num_procs), Vec::new())
        } else {
            let k = rng.gen_range(0..n_hosts);
            let mut mirrors = self.hosts.to_vec();
            let owner = mirrors.remove(k);
            (owner, mirrors)
        };
        VertexRecord {
            vertex,
            owner,
            mirrors,
            in_edges: self.in_edges,
            out_edges: self.out_edges,
            payload: self.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::merge::{MergeWith, RejectMultiple};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn combine_sums_and_unions() {
        let mut a = PartialVertexRecord::<u32>::empty(4);
        a.absorb_touch(&EdgeTouch::outgoing(7u8, 1));
        let mut b = PartialVertexRecord::<u32>::empty(4);
        b.absorb_touch(&EdgeTouch::incoming(7u8, 3));
        b.absorb_touch(&EdgeTouch::incoming(7u8, 1));
        a.combine(b, &RejectMultiple).unwrap();
        assert_eq!(a.hosts.to_vec(), vec![1, 3]);
        assert_eq!((a.in_edges, a.out_edges), (2, 1));
    }

    #[test]
    fn payload_policies() {
        let mut a = PartialVertexRecord::empty(2);
        a.absorb_payload(5u32, &RejectMultiple).unwrap();
        assert_eq!(a.absorb_payload(6, &RejectMultiple), Err(Unmergeable));
        assert_eq!(a.payload, Some(5));

        let sum = MergeWith(|x: u32, y: u32| x + y);
        let mut b = PartialVertexRecord::empty(2);
        b.absorb_payload(5u32, &sum).unwrap();
        b.absorb_payload(6, &sum).unwrap();
        assert_eq!(b.payload, Some(11));
    }

    #[test]
    fn refused_combine_keeps_held_payload_and_degrees() {
        let mut a = PartialVertexRecord::empty(4);
        a.absorb_touch(&EdgeTouch::outgoing(1u8, 0));
        a.absorb_payload("kept", &RejectMultiple).unwrap();
        let mut b = PartialVertexRecord::empty(4);
        b.absorb_touch(&EdgeTouch::incoming(1u8, 2));
        b.absorb_payload("dropped", &RejectMultiple).unwrap();
        assert_eq!(a.combine(b, &RejectMultiple), Err(Unmergeable));
        assert_eq!(a.payload, Some("kept"));
        assert_eq!(a.hosts.to_vec(), vec![0, 2]);
        assert_eq!((a.in_edges, a.out_edges), (1, 1));
    }

    #[test]
    fn election_owner_not_in_mirrors() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..50 {
            let mut p = PartialVertexRecord::<()>::empty(8);
            for h in [0, 2, 5, 7] {
                p.absorb_touch(&EdgeTouch::outgoing((), h));
            }
            let r = p.elect("v", 8, &mut rng);
            assert!(!r.mirrors.contains(&r.owner));
            let mut all: Vec<_> = r.hosts().collect();
            all.sort_unstable();
            assert_eq!(all, vec![0, 2, 5, 7]);
            assert_eq!(r.num_replicas(), 4);
        }
    }

    #[test]
    fn untouched_vertex_gets_random_owner() {
        let mut rng = SmallRng::seed_from_u64(9);
        let r = PartialVertexRecord::<()>::empty(5).elect(1u32, 5, &mut rng);
        assert!(r.owner < 5);
        assert!(r.mirrors.is_empty());
    }
}
