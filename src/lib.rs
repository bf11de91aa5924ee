//! # graph-ingress
//!
//! graph-ingress is the loading stage of a distributed graph engine. It places
//! a stream of directed edges onto `P` partitions (a vertex cut), folds the
//! scattered per-vertex metadata into one record per vertex with an elected
//! owner, and builds the local CSR/CSC adjacency each partition serves
//! queries from.
//!
//! ## Pipeline
//! 1. **Ingress**: a [`partitioning::IngressStrategy`] maps every edge to a
//!    partition id. Hash-based, grid/PDS-constrained, and greedy
//!    (replication-minimizing) strategies are available through
//!    [`partitioning::build_ingress`].
//! 2. **Aggregation**: each placed edge yields two
//!    [`aggregate::EdgeTouch`] fragments. A
//!    [`aggregate::VertexRecordAggregator`] combines them with the vertex
//!    payloads into [`aggregate::VertexRecord`]s.
//! 3. **Local graph**: every partition feeds its edges into a
//!    [`local_graph::PartitionedGraphBuilder`] and calls `finalize()`.
//!
//! The shuffle between stages, the record source, and the query engine live
//! outside this crate.
//!
//! ## Determinism
//!
//! All randomized decisions use `SmallRng` seeds drawn from configuration so
//! runs are reproducible. Owner election is keyed by vertex id, so aggregation
//! results do not depend on fragment order or on how work was split across
//! threads. Unit tests fix seeds explicitly.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: `debug` for stage summaries,
//! `warn` when a PDS constraint falls back to a grid or a finalize fails.
//! Install any `log` backend to see them.

pub mod aggregate;
pub mod bounds;
pub mod graph_error;
pub mod local_graph;
pub mod parallel;
pub mod partitioning;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::aggregate::{
        aggregate_parallel, AggregatorConfig, EdgeTouch, MergeWith, PayloadMerge,
        RejectMultiple, VertexFragment, VertexRecord, VertexRecordAggregator,
    };
    pub use crate::bounds::{PayloadLike, VertexLike};
    pub use crate::graph_error::GraphError;
    pub use crate::local_graph::{
        BuilderConfig, EdgeHandle, LocalEdge, PartitionedGraphBuilder, SparseGraphStruct,
    };
    pub use crate::partitioning::{
        assign_edge, build_ingress, build_ingress_by_name, ConstraintGraph, ConstraintKind,
        EdgeAssignment, IngressAlgorithm, IngressConfig, IngressError, IngressStrategy,
        PartitionId, PartitionSet,
    };
}
