//! Per-vertex fragments emitted by ingress and the upstream record source.

use crate::partitioning::PartitionId;
use serde::{Deserialize, Serialize};

/// A vertex was referenced by an edge placed on `partition`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeTouch<V> {
    pub vertex: V,
    pub partition: PartitionId,
    pub in_delta: u64,
    pub out_delta: u64,
}

impl<V> EdgeTouch<V> {
    pub fn new(vertex: V, partition: PartitionId, in_delta: u64, out_delta: u64) -> Self {
        Self {
            vertex,
            partition,
            in_delta,
            out_delta,
        }
    }

    /// Touch for the source endpoint of one edge.
    pub fn outgoing(vertex: V, partition: PartitionId) -> Self {
        Self::new(vertex, partition, 0, 1)
    }

    /// Touch for the target endpoint of one edge.
    pub fn incoming(vertex: V, partition: PartitionId) -> Self {
        Self::new(vertex, partition, 1, 0)
    }
}

/// One scattered piece of a vertex's metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexFragment<V, P> {
    /// Degree deltas and a hosting partition.
    Touch(EdgeTouch<V>),
    /// The vertex's own data, from the record source.
    Payload { vertex: V, payload: P },
}

impl<V, P> VertexFragment<V, P> {
    pub fn vertex(&self) -> &V {
        match self {
            VertexFragment::Touch(t) => &t.vertex,
            VertexFragment::Payload { vertex, .. } => vertex,
        }
    }
}

impl<V, P> From<EdgeTouch<V>> for VertexFragment<V, P> {
    fn from(t: EdgeTouch<V>) -> Self {
        VertexFragment::Touch(t)
    }
}
