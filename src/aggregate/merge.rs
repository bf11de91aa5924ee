//! Payload merge policies for vertices that receive more than one payload.
//!
//! A merge must be associative and commutative; aggregation order is not
//! specified.

/// Combines two payloads of the same vertex.
///
/// A refusal hands `left` back untouched so the caller keeps the payload it
/// already held; `right` is dropped. The aggregator reports refusals as
/// [`GraphError::PayloadNotMergeable`](crate::graph_error::GraphError::PayloadNotMergeable).
pub trait PayloadMerge<P> {
    fn merge(&self, left: P, right: P) -> Result<P, P>;
}

/// Refuses to merge: each vertex may carry at most one payload fragment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RejectMultiple;

impl<P> PayloadMerge<P> for RejectMultiple {
    fn merge(&self, left: P, _right: P) -> Result<P, P> {
        Err(left)
    }
}

/// Merges with a caller-supplied associative, commutative function.
#[derive(Clone, Copy, Debug)]
pub struct MergeWith<F>(pub F);

impl<P, F> PayloadMerge<P> for MergeWith<F>
where
    F: Fn(P, P) -> P,
{
    fn merge(&self, left: P, right: P) -> Result<P, P> {
        Ok((self.0)(left, right))
    }
}
