//! Partitioning quality metrics.
//!
//! Replication factor and load balance of a vertex-cut assignment. Intended
//! for debugging, testing, and comparing ingress strategies.

use crate::aggregate::record::VertexRecord;

/// Average number of partitions hosting each vertex (owner plus mirrors).
///
/// Returns 0.0 for an empty slice.
pub fn replication_factor<V, P>(records: &[VertexRecord<V, P>]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: usize = records.iter().map(|r| r.mirrors.len() + 1).sum();
    total as f64 / records.len() as f64
}

/// `max(loads) - min(loads)`; 0 for an empty slice.
pub fn load_imbalance(loads: &[u64]) -> u64 {
    let max = loads.iter().copied().max().unwrap_or(0);
    let min = loads.iter().copied().min().unwrap_or(0);
    max - min
}

/// `max(loads) / mean(loads)`; 1.0 when perfectly balanced or empty.
pub fn relative_max_load(loads: &[u64]) -> f64 {
    let total: u64 = loads.iter().sum();
    if total == 0 {
        return 1.0;
    }
    let max = loads.iter().copied().max().unwrap_or(0);
    max as f64 * loads.len() as f64 / total as f64
}
