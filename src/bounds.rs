//! Common bound aliases used across ingress, aggregation, and local-graph code.
//!
//! These traits have blanket impls, so any type satisfying the underlying
//! bounds will automatically implement them. They are zero-cost and only
//! reduce duplication in `where` clauses.

/// Canonical bound set for vertex identifiers.
///
/// - `Clone` rather than `Copy` so string or composite keys work
/// - `Eq + Hash` for hash-map backed remaps and presence tables
/// - `Ord` to allow deterministic ordering of emitted records
/// - `Debug` for diagnostics in error messages
/// - `Send + Sync` so ids can cross rayon workers
pub trait VertexLike: Clone + Eq + std::hash::Hash + Ord + std::fmt::Debug + Send + Sync {}
impl<T> VertexLike for T where T: Clone + Eq + std::hash::Hash + Ord + std::fmt::Debug + Send + Sync {}

/// Minimal bound for edge and vertex payloads.
pub trait PayloadLike: Send {}
impl<T: Send> PayloadLike for T {}
