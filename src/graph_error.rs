//! GraphError: unified error type for local-graph construction and vertex aggregation.
//!
//! Builder accessors, finalize, and the vertex-record aggregator all report
//! failures through this type instead of panicking.

use thiserror::Error;

/// Errors raised by [`PartitionedGraphBuilder`](crate::local_graph::PartitionedGraphBuilder)
/// and [`VertexRecordAggregator`](crate::aggregate::VertexRecordAggregator).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A read accessor was called before `finalize()` succeeded.
    #[error("local graph is not finalized")]
    NotFinalized,
    /// An edge was added after the graph was finalized.
    #[error("local graph is finalized; call clear() before adding edges")]
    AlreadyFinalized,
    /// A previous finalize attempt failed; the builder must be cleared.
    #[error("finalize failed: {0}")]
    FinalizeFailed(String),
    /// Batch insert arrays disagree in length.
    #[error("batch length mismatch: {sources} sources, {targets} targets, {payloads} payloads")]
    LengthMismatch {
        sources: usize,
        targets: usize,
        payloads: usize,
    },
    /// An edge handle does not address an edge of the finalized graph.
    #[error("edge handle {0} is out of range")]
    InvalidEdgeHandle(usize),
    /// Local indices are 32-bit; the partition holds more edges or vertices than fit.
    #[error("local graph exceeds 32-bit index space ({0} entries)")]
    TooManyEdges(usize),
    /// More than one payload fragment arrived for a vertex whose payload cannot merge.
    #[error("vertex `{0}` received multiple payloads but no merge was supplied")]
    PayloadNotMergeable(String),
    /// A fragment named a partition outside `[0, num_procs)`.
    #[error("partition {partition} is out of range for {num_procs} partitions")]
    InvalidPartition { partition: usize, num_procs: usize },
    /// Owner election needs at least one partition.
    #[error("number of partitions must be positive, got {0}")]
    InvalidNumProcs(usize),
}
