//! Compressed sparse adjacency (CSR or CSC, depending on the key).
//!
//! `offsets` has one entry per local vertex plus a trailing total; row `v`
//! occupies `indices[offsets[v]..offsets[v + 1]]`. An empty row has no begin
//! position, and its end coincides with the begin of the next non-empty row
//! (or the array end).

use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use std::ops::Range;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseGraphStruct {
    offsets: Vec<u32>,
    indices: Vec<u32>,
}

assert_impl_all!(SparseGraphStruct: Send, Sync, Clone);

impl SparseGraphStruct {
    /// Wraps prebuilt arrays. `offsets` must be monotone, start at 0, and end
    /// at `indices.len()`.
    pub(crate) fn from_parts(offsets: Vec<u32>, indices: Vec<u32>) -> Self {
        debug_assert_eq!(offsets.first().copied(), Some(0));
        debug_assert_eq!(offsets.last().copied(), Some(indices.len() as u32));
        Self { offsets, indices }
    }

    pub fn num_rows(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn num_entries(&self) -> usize {
        self.indices.len()
    }

    /// First position of row `v`, or `None` if the row is empty or out of range.
    pub fn begin(&self, v: usize) -> Option<usize> {
        let r = self.range(v);
        (!r.is_empty()).then_some(r.start)
    }

    /// One past the last position of row `v`.
    pub fn end(&self, v: usize) -> usize {
        self.range(v).end
    }

    #[inline]
    pub fn range(&self, v: usize) -> Range<usize> {
        if v + 1 >= self.offsets.len() {
            return 0..0;
        }
        self.offsets[v] as usize..self.offsets[v + 1] as usize
    }

    #[inline]
    pub fn degree(&self, v: usize) -> usize {
        self.range(v).len()
    }

    /// Column indices of row `v`.
    pub fn row(&self, v: usize) -> &[u32] {
        &self.indices[self.range(v)]
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}
