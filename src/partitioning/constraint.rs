//! Shard-neighborhood constraint graphs.
//!
//! A [`ConstraintGraph`] maps each partition to a sorted neighborhood of
//! partitions. Constrained ingress places an edge only inside the join
//! (intersection) of its endpoints' master neighborhoods, which bounds how many
//! partitions any single vertex can be replicated to.
//!
//! Two constructions are supported:
//! - **Grid**: partitions laid out row-major on an `n × n` grid with
//!   `n = ⌈√P⌉`; a neighborhood is the partition's row plus its column.
//! - **Perfect difference set**: for `P = p² + p + 1` with `p` prime, the
//!   neighborhood of `i` is the PDS translated by `i`. Any two such
//!   neighborhoods share exactly one partition.

use super::error::IngressError;
use super::pds::{find_pds, pds_order};
use super::PartitionId;
use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};

/// Which construction produced a [`ConstraintGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    Grid,
    PerfectDifferenceSet,
}

/// Partition id → sorted shard neighborhood.
#[derive(Clone, Debug)]
pub struct ConstraintGraph {
    kind: ConstraintKind,
    neighborhoods: Vec<Vec<PartitionId>>,
}

impl ConstraintGraph {
    /// Row ∪ column neighborhoods on an `⌈√P⌉ × ⌈√P⌉` grid.
    pub fn grid(num_procs: usize) -> Result<Self, IngressError> {
        if num_procs == 0 {
            return Err(IngressError::InvalidNumProcs(num_procs));
        }
        let n = grid_side(num_procs);
        let neighborhoods = (0..num_procs)
            .map(|i| {
                let row_begin = (i / n) * n;
                let row = row_begin..(row_begin + n).min(num_procs);
                let col = (i % n..num_procs).step_by(n);
                let mut adj: Vec<PartitionId> = row.chain(col).collect();
                adj.sort_unstable();
                adj.dedup();
                adj
            })
            .collect();
        log::debug!("grid constraint: {num_procs} partitions on a {n}x{n} grid");
        Ok(Self {
            kind: ConstraintKind::Grid,
            neighborhoods,
        })
    }

    /// PDS neighborhoods when `num_procs = p² + p + 1` for prime `p`.
    ///
    /// Any other partition count falls back to [`ConstraintGraph::grid`]; check
    /// [`ConstraintGraph::kind`] to detect the fallback.
    pub fn perfect_difference_set(num_procs: usize) -> Result<Self, IngressError> {
        if num_procs == 0 {
            return Err(IngressError::InvalidNumProcs(num_procs));
        }
        let Some(set) = pds_order(num_procs).and_then(find_pds) else {
            log::warn!(
                "{num_procs} partitions is not p^2+p+1 for a prime p; \
                 falling back to grid constraint"
            );
            return Self::grid(num_procs);
        };
        let neighborhoods = (0..num_procs)
            .map(|i| {
                let mut adj: Vec<PartitionId> =
                    set.iter().map(|&d| (d + i) % num_procs).collect();
                adj.sort_unstable();
                adj
            })
            .collect();
        log::debug!(
            "pds constraint: {num_procs} partitions, neighborhood size {}",
            set.len()
        );
        Ok(Self {
            kind: ConstraintKind::PerfectDifferenceSet,
            neighborhoods,
        })
    }

    pub fn num_procs(&self) -> usize {
        self.neighborhoods.len()
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    /// Sorted neighborhood of partition `p`.
    ///
    /// # Panics
    /// Panics if `p >= num_procs`.
    pub fn neighborhood(&self, p: PartitionId) -> &[PartitionId] {
        &self.neighborhoods[p]
    }

    /// Intersection of the neighborhoods of `a` and `b`, sorted.
    pub fn join(&self, a: PartitionId, b: PartitionId) -> Vec<PartitionId> {
        let mut out = Vec::new();
        self.join_into(a, b, &mut out);
        out
    }

    /// Like [`ConstraintGraph::join`] but reuses `out`.
    pub fn join_into(&self, a: PartitionId, b: PartitionId, out: &mut Vec<PartitionId>) {
        out.clear();
        sorted_intersection(&self.neighborhoods[a], &self.neighborhoods[b], out);
    }
}

/// Smallest `n` with `n * n >= num_procs`.
fn grid_side(num_procs: usize) -> usize {
    let mut n = (num_procs as f64).sqrt() as usize;
    while n * n < num_procs {
        n += 1;
    }
    while n > 1 && (n - 1) * (n - 1) >= num_procs {
        n -= 1;
    }
    n.max(1)
}

/// Linear merge of two ascending slices, appending common elements to `out`.
pub fn sorted_intersection(a: &[PartitionId], b: &[PartitionId], out: &mut Vec<PartitionId>) {
    out.extend(
        a.iter()
            .merge_join_by(b.iter(), |x, y| x.cmp(y))
            .filter_map(|e| match e {
                EitherOrBoth::Both(x, _) => Some(*x),
                _ => None,
            }),
    );
}
