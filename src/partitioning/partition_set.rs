//! Fixed-width bitsets over partition ids.
//!
//! [`PartitionSet`] is the per-vertex presence record used by greedy ingress
//! and the hosting set accumulated during vertex aggregation.

use super::PartitionId;
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// A set of partition ids in `[0, num_procs)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PartitionSet {
    bits: BitVec<u64, Lsb0>,
}

impl PartitionSet {
    /// An empty set able to hold ids below `num_procs`.
    pub fn new(num_procs: usize) -> Self {
        Self {
            bits: bitvec![u64, Lsb0; 0; num_procs],
        }
    }

    /// A set holding only `p`.
    pub fn singleton(num_procs: usize, p: PartitionId) -> Self {
        let mut s = Self::new(num_procs.max(p + 1));
        s.insert(p);
        s
    }

    /// Capacity in partition ids.
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Inserts `p`, growing the set if needed. Returns true if newly added.
    pub fn insert(&mut self, p: PartitionId) -> bool {
        if p >= self.bits.len() {
            self.bits.resize(p + 1, false);
        }
        let was = self.bits[p];
        self.bits.set(p, true);
        !was
    }

    /// Removes `p`. Returns true if it was present.
    pub fn remove(&mut self, p: PartitionId) -> bool {
        match self.bits.get(p).map(|b| *b) {
            Some(true) => {
                self.bits.set(p, false);
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn contains(&self, p: PartitionId) -> bool {
        self.bits.get(p).is_some_and(|b| *b)
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Ascending iterator over members.
    pub fn iter(&self) -> impl Iterator<Item = PartitionId> + '_ {
        self.bits.iter_ones()
    }

    /// The `k`-th smallest member, if any.
    pub fn nth(&self, k: usize) -> Option<PartitionId> {
        self.bits.iter_ones().nth(k)
    }

    /// In-place union.
    pub fn union_with(&mut self, other: &PartitionSet) {
        if other.bits.len() > self.bits.len() {
            self.bits.resize(other.bits.len(), false);
        }
        for p in other.bits.iter_ones() {
            self.bits.set(p, true);
        }
    }

    pub fn to_vec(&self) -> Vec<PartitionId> {
        self.iter().collect()
    }
}

impl FromIterator<PartitionId> for PartitionSet {
    fn from_iter<I: IntoIterator<Item = PartitionId>>(iter: I) -> Self {
        let mut s = PartitionSet::default();
        for p in iter {
            s.insert(p);
        }
        s
    }
}
