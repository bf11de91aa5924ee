//! Deterministic hashing of vertex ids and edges onto partitions.
//!
//! All strategies hash through a fixed-key [`AHasher`], so `master_of` and
//! `edge_hash` are pure functions of their inputs.

use super::PartitionId;
use ahash::AHasher;
use std::hash::{Hash, Hasher};

/// Hash of a single vertex id.
#[inline]
pub fn vertex_hash<V: Hash + ?Sized>(v: &V) -> u64 {
    let mut h = AHasher::default();
    v.hash(&mut h);
    h.finish()
}

/// Hash of an ordered `(source, target)` pair.
#[inline]
pub fn edge_hash<V: Hash + ?Sized>(source: &V, target: &V) -> u64 {
    let mut h = AHasher::default();
    source.hash(&mut h);
    target.hash(&mut h);
    h.finish()
}

/// The partition a vertex hashes to: `hash(v) mod num_procs`.
///
/// `num_procs` must be positive.
#[inline]
pub fn master_of<V: Hash + ?Sized>(v: &V, num_procs: usize) -> PartitionId {
    (vertex_hash(v) % num_procs as u64) as PartitionId
}
