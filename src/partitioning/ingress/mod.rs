//! Streaming edge-to-partition assignment strategies.
//!
//! Every strategy implements [`IngressStrategy`]. Stateless variants
//! ([`RandomIngress`], [`ConstrainedRandomIngress`]) are pure functions of
//! `(source, target, num_procs)`; the greedy variants also depend on the
//! sequence of prior calls on the same instance. Instances are not meant to be
//! shared: run one sequential assignment stream per instance.

pub mod constrained_random;
pub mod greedy;
pub mod random;

pub use self::constrained_random::ConstrainedRandomIngress;
pub use self::greedy::{ConstrainedGreedyIngress, GreedyIngress};
pub use self::random::RandomIngress;

use super::error::IngressError;
use super::PartitionId;
use crate::aggregate::fragment::EdgeTouch;

/// Assigns each edge of a stream to exactly one partition.
pub trait IngressStrategy<V> {
    /// Number of partitions this strategy assigns into.
    fn num_procs(&self) -> usize;

    /// Partition for the edge `source → target`, in `[0, num_procs)`.
    fn compute_pid(&mut self, source: &V, target: &V) -> Result<PartitionId, IngressError>;
}

impl<V, S> IngressStrategy<V> for Box<S>
where
    S: IngressStrategy<V> + ?Sized,
{
    fn num_procs(&self) -> usize {
        (**self).num_procs()
    }

    fn compute_pid(&mut self, source: &V, target: &V) -> Result<PartitionId, IngressError> {
        (**self).compute_pid(source, target)
    }
}

/// One edge after ingress: its partition plus the two vertex-touch fragments
/// that feed vertex aggregation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeAssignment<V, E> {
    pub pid: PartitionId,
    pub source: V,
    pub target: V,
    pub payload: E,
    /// `source` was touched on `pid` with one outgoing edge.
    pub source_touch: EdgeTouch<V>,
    /// `target` was touched on `pid` with one incoming edge.
    pub target_touch: EdgeTouch<V>,
}

/// Runs `strategy` on one edge and packages the result for the shuffle.
pub fn assign_edge<V, E, S>(
    strategy: &mut S,
    source: V,
    target: V,
    payload: E,
) -> Result<EdgeAssignment<V, E>, IngressError>
where
    V: Clone,
    S: IngressStrategy<V> + ?Sized,
{
    let pid = strategy.compute_pid(&source, &target)?;
    Ok(EdgeAssignment {
        pid,
        source_touch: EdgeTouch::outgoing(source.clone(), pid),
        target_touch: EdgeTouch::incoming(target.clone(), pid),
        source,
        target,
        payload,
    })
}
