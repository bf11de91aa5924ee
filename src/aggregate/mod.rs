//! Vertex-record aggregation.
//!
//! Ingress emits two [`EdgeTouch`] fragments per edge and the record source
//! emits payload fragments. After the shuffle groups them by vertex id, a
//! [`VertexRecordAggregator`] folds them into exactly one [`VertexRecord`] per
//! vertex with an elected owner and a mirror set.

pub mod aggregator;
pub mod fragment;
pub mod merge;
pub mod record;

pub use self::aggregator::{aggregate_parallel, AggregatorConfig, VertexRecordAggregator};
pub use self::fragment::{EdgeTouch, VertexFragment};
pub use self::merge::{MergeWith, PayloadMerge, RejectMultiple};
pub use self::record::{PartialVertexRecord, VertexRecord};
