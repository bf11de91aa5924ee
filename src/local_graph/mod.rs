//! Per-partition local graph: edge accumulation, then a finalize step that
//! builds CSR (by source) and CSC (by target) adjacency with a cross-index
//! between the two edge orders.

pub mod builder;
pub mod counting_sort;
pub mod iter;
pub mod sparse;

pub use self::builder::{BuilderConfig, PartitionedGraphBuilder};
pub use self::iter::{EdgeHandle, InEdges, LocalEdge, Neighbors, OutEdges};
pub use self::sparse::SparseGraphStruct;
