//! Per-partition edge accumulation and CSR/CSC finalize.
//!
//! A [`PartitionedGraphBuilder`] goes through three states:
//! - **accumulating**: `add_edge`/`add_edges` remap global ids to dense local
//!   indices in first-appearance order and append to parallel arrays. Writers
//!   may call concurrently; a mutex serializes them.
//! - **finalized**: `finalize()` counting-sorts the edges by source into CSR,
//!   then by target into CSC, and records a CSC→CSR position translation.
//!   Read accessors are valid only here.
//! - **failed**: finalize did not complete; the arrays were released and
//!   only `clear()` recovers.
//!
//! `clear()` returns any state to an empty accumulating builder.

use super::counting_sort::{bucket_sort, permute_in_place};
use super::iter::{EdgeHandle, InEdges, Neighbors, OutEdges};
use super::sparse::SparseGraphStruct;
use crate::bounds::{PayloadLike, VertexLike};
use crate::graph_error::GraphError;
use crate::parallel::worker_pool;
use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

const MAX_LOCAL: usize = u32::MAX as usize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Finalize workers; 0 uses the ambient rayon pool.
    pub num_threads: usize,
}

/// Accumulating state: id remap plus three parallel edge arrays.
#[derive(Debug)]
struct EdgeBuffer<V, E> {
    local_of: HashMap<V, u32>,
    global_of: Vec<V>,
    sources: Vec<u32>,
    targets: Vec<u32>,
    payloads: Vec<E>,
}

impl<V, E> Default for EdgeBuffer<V, E> {
    fn default() -> Self {
        Self {
            local_of: HashMap::new(),
            global_of: Vec::new(),
            sources: Vec::new(),
            targets: Vec::new(),
            payloads: Vec::new(),
        }
    }
}

impl<V: VertexLike, E> EdgeBuffer<V, E> {
    fn local_id(&mut self, v: V) -> u32 {
        if let Some(&i) = self.local_of.get(&v) {
            return i;
        }
        let i = self.global_of.len() as u32;
        self.global_of.push(v.clone());
        self.local_of.insert(v, i);
        i
    }

    /// Distinct vertices among `vs` that have no local index yet.
    fn count_new<'a, I>(&self, vs: I) -> usize
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        let mut fresh = HashSet::new();
        vs.into_iter()
            .filter(|&v| !self.local_of.contains_key(v) && fresh.insert(v))
            .count()
    }

    /// Fails if the new edges or vertices would overflow 32-bit local indices.
    fn reserve(&mut self, new_edges: usize, new_vertices: usize) -> Result<(), GraphError> {
        check_limits(
            self.sources.len() + new_edges,
            self.global_of.len() + new_vertices,
        )?;
        self.sources.reserve(new_edges);
        self.targets.reserve(new_edges);
        self.payloads.reserve(new_edges);
        Ok(())
    }

    fn push(&mut self, source: V, target: V, payload: E) {
        let s = self.local_id(source);
        let t = self.local_id(target);
        self.sources.push(s);
        self.targets.push(t);
        self.payloads.push(payload);
    }
}

fn check_limits(edges: usize, vertices: usize) -> Result<(), GraphError> {
    if edges > MAX_LOCAL {
        return Err(GraphError::TooManyEdges(edges));
    }
    if vertices > MAX_LOCAL {
        return Err(GraphError::TooManyEdges(vertices));
    }
    Ok(())
}

/// Read-only result of a successful finalize.
#[derive(Debug)]
struct FinalizedGraph<V, E> {
    local_of: HashMap<V, u32>,
    global_of: Vec<V>,
    csr: SparseGraphStruct,
    csc: SparseGraphStruct,
    /// `csc_to_csr[k]` is the CSR position of the edge at CSC position `k`.
    csc_to_csr: Vec<u32>,
    /// Payloads in CSR order.
    payloads: Vec<E>,
}

#[derive(Debug)]
enum BuildState<V, E> {
    Accumulating,
    Finalized(FinalizedGraph<V, E>),
    Failed(String),
}

/// Local adjacency for one partition.
#[derive(Debug)]
pub struct PartitionedGraphBuilder<V, E> {
    cfg: BuilderConfig,
    pool: Option<Arc<rayon::ThreadPool>>,
    buffer: Mutex<EdgeBuffer<V, E>>,
    state: BuildState<V, E>,
}

impl<V, E> Default for PartitionedGraphBuilder<V, E> {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

impl<V, E> PartitionedGraphBuilder<V, E> {
    pub fn new(cfg: BuilderConfig) -> Self {
        Self {
            cfg,
            pool: None,
            buffer: Mutex::new(EdgeBuffer::default()),
            state: BuildState::Accumulating,
        }
    }

    /// Finalize on `pool` instead of a pool built from the config.
    pub fn with_pool(mut self, pool: Arc<rayon::ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, BuildState::Finalized(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, BuildState::Failed(_))
    }

    /// Distinct local vertices, in any state.
    pub fn num_vertices(&self) -> usize {
        match &self.state {
            BuildState::Finalized(g) => g.global_of.len(),
            _ => self.buffer.lock().global_of.len(),
        }
    }

    /// Local edges, in any state.
    pub fn num_edges(&self) -> usize {
        match &self.state {
            BuildState::Finalized(g) => g.payloads.len(),
            _ => self.buffer.lock().sources.len(),
        }
    }

    /// Drops all edges, vertices, and built arrays.
    pub fn clear(&mut self) {
        *self.buffer.get_mut() = EdgeBuffer::default();
        self.state = BuildState::Accumulating;
    }

    fn accumulating(&self) -> Result<(), GraphError> {
        match &self.state {
            BuildState::Accumulating => Ok(()),
            BuildState::Finalized(_) => Err(GraphError::AlreadyFinalized),
            BuildState::Failed(msg) => Err(GraphError::FinalizeFailed(msg.clone())),
        }
    }

    fn finalized(&self) -> Result<&FinalizedGraph<V, E>, GraphError> {
        match &self.state {
            BuildState::Finalized(g) => Ok(g),
            BuildState::Accumulating => Err(GraphError::NotFinalized),
            BuildState::Failed(msg) => Err(GraphError::FinalizeFailed(msg.clone())),
        }
    }
}

impl<V, E> PartitionedGraphBuilder<V, E>
where
    V: VertexLike,
    E: PayloadLike,
{
    /// Appends one edge. Safe to call from several threads at once.
    pub fn add_edge(&self, source: V, target: V, payload: E) -> Result<(), GraphError> {
        self.accumulating()?;
        let mut buf = self.buffer.lock();
        let new_vertices = usize::from(!buf.local_of.contains_key(&source))
            + usize::from(source != target && !buf.local_of.contains_key(&target));
        buf.reserve(1, new_vertices)?;
        buf.push(source, target, payload);
        Ok(())
    }

    /// Appends a batch of edges under one lock. Mismatched lengths are rejected
    /// before anything is added.
    pub fn add_edges(
        &self,
        sources: Vec<V>,
        targets: Vec<V>,
        payloads: Vec<E>,
    ) -> Result<(), GraphError> {
        if sources.len() != targets.len() || sources.len() != payloads.len() {
            return Err(GraphError::LengthMismatch {
                sources: sources.len(),
                targets: targets.len(),
                payloads: payloads.len(),
            });
        }
        self.accumulating()?;
        let mut buf = self.buffer.lock();
        let new_vertices = buf.count_new(sources.iter().chain(&targets));
        buf.reserve(sources.len(), new_vertices)?;
        for ((s, t), p) in sources.into_iter().zip(targets).zip(payloads) {
            buf.push(s, t, p);
        }
        Ok(())
    }

    /// Builds the CSR and CSC views. Idempotent once it has succeeded.
    ///
    /// On failure the builder is left failed, holding no edges; call
    /// [`clear`](Self::clear) to start over.
    pub fn finalize(&mut self) -> Result<(), GraphError> {
        match &self.state {
            BuildState::Finalized(_) => return Ok(()),
            BuildState::Failed(msg) => return Err(GraphError::FinalizeFailed(msg.clone())),
            BuildState::Accumulating => {}
        }
        let buf = std::mem::take(self.buffer.get_mut());
        let (num_vertices, num_edges) = (buf.global_of.len(), buf.sources.len());

        let pool = match (self.pool.clone(), self.cfg.num_threads) {
            (Some(p), _) => Some(p),
            (None, 0) => None,
            (None, n) => match worker_pool(n) {
                Ok(p) => Some(Arc::new(p)),
                Err(e) => return Err(self.fail(format!("worker pool: {e}"))),
            },
        };
        let built = catch_unwind(AssertUnwindSafe(|| match &pool {
            Some(p) => p.install(|| build(buf)),
            None => build(buf),
        }));
        match built {
            Ok(graph) => {
                log::debug!("finalized local graph: {num_vertices} vertices, {num_edges} edges");
                self.state = BuildState::Finalized(graph);
                Ok(())
            }
            Err(_) => Err(self.fail("worker panicked during finalize".to_string())),
        }
    }

    fn fail(&mut self, msg: String) -> GraphError {
        log::warn!("finalize failed: {msg}");
        self.state = BuildState::Failed(msg.clone());
        GraphError::FinalizeFailed(msg)
    }

    /// Dense local index of `v`, if it appears in this partition.
    pub fn local_index(&self, v: &V) -> Result<Option<u32>, GraphError> {
        Ok(self.finalized()?.local_of.get(v).copied())
    }

    /// Global id of local index `i`.
    pub fn global_id(&self, i: u32) -> Result<Option<&V>, GraphError> {
        Ok(self.finalized()?.global_of.get(i as usize))
    }

    /// Global ids in local-index order.
    pub fn vertices(&self) -> Result<&[V], GraphError> {
        Ok(&self.finalized()?.global_of)
    }

    pub fn num_out_edges(&self, v: &V) -> Result<usize, GraphError> {
        let g = self.finalized()?;
        Ok(g.local_of.get(v).map_or(0, |&i| g.csr.degree(i as usize)))
    }

    pub fn num_in_edges(&self, v: &V) -> Result<usize, GraphError> {
        let g = self.finalized()?;
        Ok(g.local_of.get(v).map_or(0, |&i| g.csc.degree(i as usize)))
    }

    /// Outgoing edges of `v`; empty if `v` is not local.
    pub fn out_edges(&self, v: &V) -> Result<OutEdges<'_, V>, GraphError> {
        let g = self.finalized()?;
        let (source, range) = match g.local_of.get(v) {
            Some(&i) => (i as usize, g.csr.range(i as usize)),
            None => (0, 0..0),
        };
        Ok(OutEdges {
            global_of: &g.global_of,
            csr: &g.csr,
            source,
            pos: range.start,
            end: range.end,
        })
    }

    /// Incoming edges of `v`; empty if `v` is not local.
    pub fn in_edges(&self, v: &V) -> Result<InEdges<'_, V>, GraphError> {
        let g = self.finalized()?;
        let (target, range) = match g.local_of.get(v) {
            Some(&i) => (i as usize, g.csc.range(i as usize)),
            None => (0, 0..0),
        };
        Ok(InEdges {
            global_of: &g.global_of,
            csc: &g.csc,
            target,
            pos: range.start,
            end: range.end,
        })
    }

    pub fn out_neighbors(&self, v: &V) -> Result<Neighbors<'_, V>, GraphError> {
        let g = self.finalized()?;
        let row: &[u32] = g.local_of.get(v).map_or(&[], |&i| g.csr.row(i as usize));
        Ok(Neighbors {
            global_of: &g.global_of,
            row: row.iter(),
        })
    }

    pub fn in_neighbors(&self, v: &V) -> Result<Neighbors<'_, V>, GraphError> {
        let g = self.finalized()?;
        let row: &[u32] = g.local_of.get(v).map_or(&[], |&i| g.csc.row(i as usize));
        Ok(Neighbors {
            global_of: &g.global_of,
            row: row.iter(),
        })
    }

    /// Payload of the edge behind `handle`, from either view.
    pub fn edge_payload(&self, handle: EdgeHandle) -> Result<&E, GraphError> {
        let g = self.finalized()?;
        let csr_pos = match handle {
            EdgeHandle::Out(k) => k as usize,
            EdgeHandle::In(k) => *g
                .csc_to_csr
                .get(k as usize)
                .ok_or(GraphError::InvalidEdgeHandle(k as usize))? as usize,
        };
        g.payloads
            .get(csr_pos)
            .ok_or(GraphError::InvalidEdgeHandle(csr_pos))
    }

    /// CSR view: rows are sources, indices are targets.
    pub fn csr(&self) -> Result<&SparseGraphStruct, GraphError> {
        Ok(&self.finalized()?.csr)
    }

    /// CSC view: rows are targets, indices are sources.
    pub fn csc(&self) -> Result<&SparseGraphStruct, GraphError> {
        Ok(&self.finalized()?.csc)
    }

    pub fn csc_to_csr(&self) -> Result<&[u32], GraphError> {
        Ok(&self.finalized()?.csc_to_csr)
    }

    /// Edge payloads in CSR order.
    pub fn payloads(&self) -> Result<&[E], GraphError> {
        Ok(&self.finalized()?.payloads)
    }
}

/// Sorts the buffer into CSR, applies the permutation, then derives CSC.
fn build<V, E: Send>(buf: EdgeBuffer<V, E>) -> FinalizedGraph<V, E> {
    #[cfg(test)]
    if tests::FAIL_NEXT_BUILD.with(|f| f.replace(false)) {
        panic!("injected finalize failure");
    }
    let EdgeBuffer {
        local_of,
        global_of,
        mut sources,
        mut targets,
        mut payloads,
    } = buf;
    let n = global_of.len();

    let by_source = bucket_sort(&sources, &targets, n);
    let perm = &by_source.permutation;
    rayon::join(
        || permute_in_place(&mut sources, perm),
        || {
            rayon::join(
                || permute_in_place(&mut targets, perm),
                || permute_in_place(&mut payloads, perm),
            )
        },
    );
    let csr = SparseGraphStruct::from_parts(by_source.offsets, targets.clone());

    let by_target = bucket_sort(&targets, &sources, n);
    let csc_sources: Vec<u32> = by_target
        .permutation
        .iter()
        .map(|&k| sources[k as usize])
        .collect();
    let csc = SparseGraphStruct::from_parts(by_target.offsets, csc_sources);

    FinalizedGraph {
        local_of,
        global_of,
        csr,
        csc,
        csc_to_csr: by_target.permutation,
        payloads,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    thread_local! {
        pub(super) static FAIL_NEXT_BUILD: Cell<bool> = const { Cell::new(false) };
    }

    fn sample() -> PartitionedGraphBuilder<u64, String> {
        let b = PartitionedGraphBuilder::default();
        for (s, t) in [(0, 3), (0, 6), (2, 3), (3, 4), (0, 1)] {
            b.add_edge(s, t, format!("{s}->{t}")).unwrap();
        }
        b
    }

    #[test]
    fn local_ids_in_first_appearance_order() {
        let mut b = sample();
        b.finalize().unwrap();
        assert_eq!(b.vertices().unwrap(), &[0, 3, 6, 2, 4, 1]);
        assert_eq!(b.local_index(&2).unwrap(), Some(3));
        assert_eq!(b.global_id(5).unwrap(), Some(&1));
        assert_eq!(b.local_index(&99).unwrap(), None);
    }

    #[test]
    fn csr_and_csc_agree() {
        let mut b = sample();
        b.finalize().unwrap();
        let csr = b.csr().unwrap();
        let csc = b.csc().unwrap();
        assert_eq!(csr.offsets(), &[0, 3, 4, 4, 5, 5, 5]);
        assert_eq!(csr.row(0), &[1, 2, 5]);
        assert_eq!(csc.row(1), &[0, 3]);
        for (k, &r) in b.csc_to_csr().unwrap().iter().enumerate() {
            let p = b.edge_payload(EdgeHandle::In(k as u32)).unwrap();
            assert_eq!(p, b.edge_payload(EdgeHandle::Out(r)).unwrap());
        }
    }

    #[test]
    fn accessors_fail_before_finalize() {
        let b = sample();
        assert_eq!(b.num_out_edges(&0), Err(GraphError::NotFinalized));
        assert!(matches!(b.out_neighbors(&0), Err(GraphError::NotFinalized)));
        assert_eq!(b.edge_payload(EdgeHandle::Out(0)), Err(GraphError::NotFinalized));
        assert_eq!(b.num_edges(), 5);
        assert_eq!(b.num_vertices(), 6);
    }

    #[test]
    fn add_after_finalize_rejected() {
        let mut b = sample();
        b.finalize().unwrap();
        assert_eq!(
            b.add_edge(1, 2, String::new()),
            Err(GraphError::AlreadyFinalized)
        );
    }

    #[test]
    fn batch_length_mismatch_leaves_builder_untouched() {
        let b = PartitionedGraphBuilder::<u32, ()>::default();
        let err = b.add_edges(vec![1, 2], vec![3], vec![(), ()]).unwrap_err();
        assert_eq!(
            err,
            GraphError::LengthMismatch { sources: 2, targets: 1, payloads: 2 }
        );
        assert_eq!(b.num_edges(), 0);
        assert_eq!(b.num_vertices(), 0);
    }

    #[test]
    fn invalid_handle() {
        let mut b = sample();
        b.finalize().unwrap();
        assert_eq!(b.edge_payload(EdgeHandle::Out(5)), Err(GraphError::InvalidEdgeHandle(5)));
        assert_eq!(b.edge_payload(EdgeHandle::In(9)), Err(GraphError::InvalidEdgeHandle(9)));
    }

    #[test]
    fn dedicated_pool() {
        let mut b = PartitionedGraphBuilder::<u32, u32>::new(BuilderConfig { num_threads: 2 });
        for i in 0..100u32 {
            b.add_edge(i % 10, (i * 7) % 13, i).unwrap();
        }
        b.finalize().unwrap();
        assert_eq!(b.num_edges(), 100);
        let total: usize = (0..10u32).map(|v| b.num_out_edges(&v).unwrap()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn failed_finalize_requires_clear() {
        let mut b = sample();
        FAIL_NEXT_BUILD.with(|f| f.set(true));
        assert!(matches!(b.finalize(), Err(GraphError::FinalizeFailed(_))));
        assert!(b.is_failed());
        assert!(!b.is_finalized());
        assert_eq!(b.num_edges(), 0);

        assert!(matches!(b.finalize(), Err(GraphError::FinalizeFailed(_))));
        assert!(matches!(b.num_out_edges(&0), Err(GraphError::FinalizeFailed(_))));
        assert!(matches!(b.csr(), Err(GraphError::FinalizeFailed(_))));
        assert!(matches!(
            b.add_edge(1, 2, String::new()),
            Err(GraphError::FinalizeFailed(_))
        ));

        b.clear();
        assert!(!b.is_failed());
        b.add_edge(1, 2, "1->2".into()).unwrap();
        b.finalize().unwrap();
        assert_eq!(b.num_out_edges(&1).unwrap(), 1);
    }

    #[test]
    fn new_vertices_counted_once() {
        let b = PartitionedGraphBuilder::<u32, ()>::default();
        b.add_edge(1, 2, ()).unwrap();
        let buf = b.buffer.lock();
        assert_eq!(buf.count_new(&[1, 3, 3, 4, 2, 4]), 2);
        assert_eq!(buf.count_new(&[1, 2]), 0);
    }

    #[test]
    fn limits_are_inclusive() {
        assert_eq!(check_limits(MAX_LOCAL, MAX_LOCAL), Ok(()));
        assert_eq!(
            check_limits(MAX_LOCAL + 1, 0),
            Err(GraphError::TooManyEdges(MAX_LOCAL + 1))
        );
        assert_eq!(
            check_limits(0, MAX_LOCAL + 1),
            Err(GraphError::TooManyEdges(MAX_LOCAL + 1))
        );
    }
}
