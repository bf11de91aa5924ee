//! Load-aware greedy edge placement.
//!
//! For each edge, every candidate partition `j` is scored as
//!
//! ```text
//! score(j) = (maxLoad - load[j]) / (maxLoad - minLoad + ε)
//!          + [source present on j] + [target present on j]
//! ```
//!
//! with `ε = 0.01`. A vertex always counts as present on its master partition
//! `hash(v) mod P`, whether or not an edge has landed there; the presence table
//! itself records only partitions that received one of its edges.
//! Partitions within `1e-5` of the maximum score tie and are broken uniformly
//! at random with the strategy's own seeded RNG. The chosen partition's load is incremented and both
//! endpoints are marked present on it.

use super::IngressStrategy;
use crate::partitioning::constraint::ConstraintGraph;
use crate::partitioning::error::IngressError;
use crate::partitioning::hashing::master_of;
use crate::partitioning::partition_set::PartitionSet;
use crate::partitioning::PartitionId;
use hashbrown::HashMap;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::hash::Hash;

const BALANCE_EPSILON: f64 = 0.01;
const TIE_TOLERANCE: f64 = 1e-5;

/// Presence table, partition loads, and the tie-breaking RNG.
#[derive(Clone, Debug)]
struct GreedyState<V, R> {
    num_procs: usize,
    presence: HashMap<V, PartitionSet>,
    loads: Vec<u64>,
    rng: R,
    scored: Vec<(PartitionId, f64)>,
    top: Vec<PartitionId>,
}

impl<V, R> GreedyState<V, R>
where
    V: Clone + Eq + Hash,
    R: Rng,
{
    fn new(num_procs: usize, rng: R) -> Result<Self, IngressError> {
        if num_procs == 0 {
            return Err(IngressError::InvalidNumProcs(num_procs));
        }
        Ok(Self {
            num_procs,
            presence: HashMap::new(),
            loads: vec![0; num_procs],
            rng,
            scored: Vec::new(),
            top: Vec::new(),
        })
    }

    /// Presence of `v` on `j`; the master partition always counts.
    fn is_present(&self, v: &V, j: PartitionId) -> bool {
        j == master_of(v, self.num_procs) || self.presence.get(v).is_some_and(|set| set.contains(j))
    }

    fn load_bounds(&self) -> (u64, u64) {
        let min = self.loads.iter().copied().min().unwrap_or(0);
        let max = self.loads.iter().copied().max().unwrap_or(0);
        (min, max)
    }

    fn score_with(&self, source: &V, target: &V, j: PartitionId, min: u64, max: u64) -> f64 {
        let balance = (max - self.loads[j]) as f64 / ((max - min) as f64 + BALANCE_EPSILON);
        balance + self.is_present(source, j) as u8 as f64 + self.is_present(target, j) as u8 as f64
    }

    fn score(&self, source: &V, target: &V, j: PartitionId) -> f64 {
        let (min, max) = self.load_bounds();
        self.score_with(source, target, j, min, max)
    }

    /// Scores `candidates`, breaks ties at random, and commits the winner.
    fn place<I>(&mut self, source: &V, target: &V, candidates: I) -> Option<PartitionId>
    where
        I: IntoIterator<Item = PartitionId>,
    {
        let (min, max) = self.load_bounds();
        let mut scored = std::mem::take(&mut self.scored);
        scored.clear();
        scored.extend(
            candidates
                .into_iter()
                .map(|j| (j, self.score_with(source, target, j, min, max))),
        );
        let mut top = std::mem::take(&mut self.top);
        near_best(&scored, &mut top);
        self.scored = scored;
        let chosen = match top.len() {
            0 => None,
            1 => Some(top[0]),
            n => Some(top[self.rng.gen_range(0..n)]),
        };
        self.top = top;
        if let Some(pid) = chosen {
            self.commit(source, target, pid);
        }
        chosen
    }

    fn commit(&mut self, source: &V, target: &V, pid: PartitionId) {
        self.loads[pid] += 1;
        let n = self.num_procs;
        for v in [source, target] {
            match self.presence.get_mut(v) {
                Some(set) => {
                    set.insert(pid);
                }
                None => {
                    self.presence.insert(v.clone(), PartitionSet::singleton(n, pid));
                }
            }
        }
    }
}

/// Collects into `out` every candidate within `TIE_TOLERANCE` of the maximum
/// score, in candidate order.
fn near_best(scored: &[(PartitionId, f64)], out: &mut Vec<PartitionId>) {
    out.clear();
    let best = scored.iter().map(|&(_, s)| s).fold(f64::NEG_INFINITY, f64::max);
    out.extend(
        scored
            .iter()
            .filter(|&&(_, s)| s >= best - TIE_TOLERANCE)
            .map(|&(j, _)| j),
    );
}

/// Greedy placement over all partitions.
#[derive(Clone, Debug)]
pub struct GreedyIngress<V, R = SmallRng> {
    state: GreedyState<V, R>,
}

impl<V> GreedyIngress<V, SmallRng>
where
    V: Clone + Eq + Hash,
{
    /// Greedy ingress with a `SmallRng` seeded from `seed`.
    pub fn new(num_procs: usize, seed: u64) -> Result<Self, IngressError> {
        Self::with_rng(num_procs, SmallRng::seed_from_u64(seed))
    }
}

impl<V, R> GreedyIngress<V, R>
where
    V: Clone + Eq + Hash,
    R: Rng,
{
    pub fn with_rng(num_procs: usize, rng: R) -> Result<Self, IngressError> {
        Ok(Self {
            state: GreedyState::new(num_procs, rng)?,
        })
    }

    /// Edges assigned to each partition so far.
    pub fn loads(&self) -> &[u64] {
        &self.state.loads
    }

    /// Partitions that received an edge of `v`, if it has been seen.
    pub fn presence(&self, v: &V) -> Option<&PartitionSet> {
        self.state.presence.get(v)
    }

    /// Current score of partition `j` for the edge `source → target`.
    pub fn score(&self, source: &V, target: &V, j: PartitionId) -> f64 {
        self.state.score(source, target, j)
    }
}

impl<V, R> IngressStrategy<V> for GreedyIngress<V, R>
where
    V: Clone + Eq + Hash,
    R: Rng,
{
    fn num_procs(&self) -> usize {
        self.state.num_procs
    }

    fn compute_pid(&mut self, source: &V, target: &V) -> Result<PartitionId, IngressError> {
        let n = self.state.num_procs;
        self.state
            .place(source, target, 0..n)
            .ok_or(IngressError::InvalidNumProcs(n))
    }
}

/// Greedy placement restricted to `join(master(source), master(target))` on a
/// grid constraint.
#[derive(Clone, Debug)]
pub struct ConstrainedGreedyIngress<V, R = SmallRng> {
    state: GreedyState<V, R>,
    constraint: ConstraintGraph,
    candidates: Vec<PartitionId>,
}

impl<V> ConstrainedGreedyIngress<V, SmallRng>
where
    V: Clone + Eq + Hash,
{
    pub fn new(num_procs: usize, seed: u64) -> Result<Self, IngressError> {
        Self::with_rng(num_procs, SmallRng::seed_from_u64(seed))
    }
}

impl<V, R> ConstrainedGreedyIngress<V, R>
where
    V: Clone + Eq + Hash,
    R: Rng,
{
    pub fn with_rng(num_procs: usize, rng: R) -> Result<Self, IngressError> {
        Ok(Self {
            constraint: ConstraintGraph::grid(num_procs)?,
            state: GreedyState::new(num_procs, rng)?,
            candidates: Vec::new(),
        })
    }

    pub fn constraint(&self) -> &ConstraintGraph {
        &self.constraint
    }

    pub fn loads(&self) -> &[u64] {
        &self.state.loads
    }

    pub fn presence(&self, v: &V) -> Option<&PartitionSet> {
        self.state.presence.get(v)
    }

    pub fn score(&self, source: &V, target: &V, j: PartitionId) -> f64 {
        self.state.score(source, target, j)
    }
}

impl<V, R> IngressStrategy<V> for ConstrainedGreedyIngress<V, R>
where
    V: Clone + Eq + Hash,
    R: Rng,
{
    fn num_procs(&self) -> usize {
        self.state.num_procs
    }

    fn compute_pid(&mut self, source: &V, target: &V) -> Result<PartitionId, IngressError> {
        let n = self.state.num_procs;
        let source_master = master_of(source, n);
        let target_master = master_of(target, n);
        let mut candidates = std::mem::take(&mut self.candidates);
        self.constraint
            .join_into(source_master, target_master, &mut candidates);
        let placed = self.state.place(source, target, candidates.iter().copied());
        self.candidates = candidates;
        placed.ok_or(IngressError::EmptyCandidateSet {
            source_master,
            target_master,
        })
    }
}
