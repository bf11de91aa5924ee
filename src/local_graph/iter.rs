//! Edge handles and adjacency iterators over a finalized local graph.

use super::sparse::SparseGraphStruct;

/// Addresses one edge from either adjacency view.
///
/// Handles are valid only for the finalize they came from; `clear()`
/// invalidates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeHandle {
    /// Position in the CSR (by source) arrays.
    Out(u32),
    /// Position in the CSC (by target) arrays.
    In(u32),
}

/// One local edge as seen from an adjacency view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalEdge<'a, V> {
    pub source: &'a V,
    pub target: &'a V,
    pub handle: EdgeHandle,
}

/// Outgoing edges of one vertex, in CSR order.
#[derive(Clone, Debug)]
pub struct OutEdges<'a, V> {
    pub(crate) global_of: &'a [V],
    pub(crate) csr: &'a SparseGraphStruct,
    pub(crate) source: usize,
    pub(crate) pos: usize,
    pub(crate) end: usize,
}

impl<'a, V> Iterator for OutEdges<'a, V> {
    type Item = LocalEdge<'a, V>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.end {
            let k = self.pos;
            self.pos += 1;
            let t = self.csr.indices()[k] as usize;
            Some(LocalEdge {
                source: &self.global_of[self.source],
                target: &self.global_of[t],
                handle: EdgeHandle::Out(k as u32),
            })
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.pos;
        (n, Some(n))
    }
}

impl<V> ExactSizeIterator for OutEdges<'_, V> {}

/// Incoming edges of one vertex, in CSC order.
#[derive(Clone, Debug)]
pub struct InEdges<'a, V> {
    pub(crate) global_of: &'a [V],
    pub(crate) csc: &'a SparseGraphStruct,
    pub(crate) target: usize,
    pub(crate) pos: usize,
    pub(crate) end: usize,
}

impl<'a, V> Iterator for InEdges<'a, V> {
    type Item = LocalEdge<'a, V>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.end {
            let k = self.pos;
            self.pos += 1;
            let s = self.csc.indices()[k] as usize;
            Some(LocalEdge {
                source: &self.global_of[s],
                target: &self.global_of[self.target],
                handle: EdgeHandle::In(k as u32),
            })
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.pos;
        (n, Some(n))
    }
}

impl<V> ExactSizeIterator for InEdges<'_, V> {}

/// Neighbor ids along one adjacency row.
#[derive(Clone, Debug)]
pub struct Neighbors<'a, V> {
    pub(crate) global_of: &'a [V],
    pub(crate) row: std::slice::Iter<'a, u32>,
}

impl<'a, V> Iterator for Neighbors<'a, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> {
        let global_of = self.global_of;
        self.row.next().map(move |&i| &global_of[i as usize])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.row.size_hint()
    }
}

impl<V> ExactSizeIterator for Neighbors<'_, V> {}
