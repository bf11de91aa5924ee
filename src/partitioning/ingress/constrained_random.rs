//! Random placement restricted to the join of the endpoints' master neighborhoods.

use super::IngressStrategy;
use crate::partitioning::constraint::ConstraintGraph;
use crate::partitioning::error::IngressError;
use crate::partitioning::hashing::{edge_hash, master_of};
use crate::partitioning::PartitionId;
use std::hash::Hash;

/// Picks `candidates[hash(source, target) mod |candidates|]` where
/// `candidates = join(master(source), master(target))`.
///
/// Built over a grid constraint ([`ConstrainedRandomIngress::grid`]) or a
/// perfect-difference-set constraint ([`ConstrainedRandomIngress::pds`]).
#[derive(Clone, Debug)]
pub struct ConstrainedRandomIngress {
    constraint: ConstraintGraph,
    scratch: Vec<PartitionId>,
}

impl ConstrainedRandomIngress {
    pub fn grid(num_procs: usize) -> Result<Self, IngressError> {
        Ok(Self::with_constraint(ConstraintGraph::grid(num_procs)?))
    }

    /// PDS neighborhoods; falls back to a grid when `num_procs` has no PDS.
    pub fn pds(num_procs: usize) -> Result<Self, IngressError> {
        Ok(Self::with_constraint(ConstraintGraph::perfect_difference_set(
            num_procs,
        )?))
    }

    pub fn with_constraint(constraint: ConstraintGraph) -> Self {
        Self {
            constraint,
            scratch: Vec::new(),
        }
    }

    pub fn constraint(&self) -> &ConstraintGraph {
        &self.constraint
    }
}

impl<V: Hash> IngressStrategy<V> for ConstrainedRandomIngress {
    fn num_procs(&self) -> usize {
        self.constraint.num_procs()
    }

    fn compute_pid(&mut self, source: &V, target: &V) -> Result<PartitionId, IngressError> {
        let n = self.constraint.num_procs();
        let source_master = master_of(source, n);
        let target_master = master_of(target, n);
        self.constraint
            .join_into(source_master, target_master, &mut self.scratch);
        if self.scratch.is_empty() {
            return Err(IngressError::EmptyCandidateSet {
                source_master,
                target_master,
            });
        }
        let k = (edge_hash(source, target) % self.scratch.len() as u64) as usize;
        Ok(self.scratch[k])
    }
}
