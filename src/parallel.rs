//! Parallel utilities shared by aggregation and finalize.
//!
//! Provides seeded per-key random number generators, so randomized decisions do
//! not depend on which worker makes them, and construction of the fixed
//! worker pool used for per-bucket sorting.

use ahash::AHasher;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::hash::{Hash, Hasher};

/// Derives a `SmallRng` from a global seed and a key.
///
/// The same `(global_seed, key)` pair always yields the same stream, regardless
/// of thread, call order, or how many other keys were seeded before it.
pub fn keyed_rng<K: Hash + ?Sized>(global_seed: u64, key: &K) -> SmallRng {
    let mut hasher = AHasher::default();
    hasher.write_u64(global_seed);
    key.hash(&mut hasher);
    SmallRng::seed_from_u64(hasher.finish())
}

/// Builds a rayon pool with `num_threads` workers (0 lets rayon pick).
pub fn worker_pool(num_threads: usize) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("graph-ingress-finalize-{i}"))
        .build()
}
