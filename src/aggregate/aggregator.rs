//! Folding scattered vertex fragments into one [`VertexRecord`] per vertex.
//!
//! The fold is commutative and associative, so partial aggregators built on
//! different workers can be [`merge`](VertexRecordAggregator::merge)d in any
//! tree shape. Owner election draws from an RNG keyed by `(rng_seed, vertex)`,
//! which makes the final records independent of fragment order and of how the
//! work was split.

use super::fragment::{EdgeTouch, VertexFragment};
use super::merge::{PayloadMerge, RejectMultiple};
use super::record::{PartialVertexRecord, VertexRecord};
use crate::bounds::VertexLike;
use crate::graph_error::GraphError;
use crate::parallel::keyed_rng;
use hashbrown::HashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub num_procs: usize,
    /// Seed for owner election.
    pub rng_seed: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            num_procs: 1,
            rng_seed: 42,
        }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.num_procs == 0 {
            return Err(GraphError::InvalidNumProcs(0));
        }
        Ok(())
    }
}

/// Accumulates fragments keyed by vertex id.
#[derive(Clone, Debug)]
pub struct VertexRecordAggregator<V, P, M = RejectMultiple> {
    cfg: AggregatorConfig,
    merger: M,
    partials: HashMap<V, PartialVertexRecord<P>>,
}

impl<V, P> VertexRecordAggregator<V, P, RejectMultiple>
where
    V: VertexLike,
{
    /// Aggregator that rejects a second payload for any vertex.
    pub fn new(cfg: AggregatorConfig) -> Result<Self, GraphError> {
        Self::with_merger(cfg, RejectMultiple)
    }
}

impl<V, P, M> VertexRecordAggregator<V, P, M>
where
    V: VertexLike,
    M: PayloadMerge<P>,
{
    pub fn with_merger(cfg: AggregatorConfig, merger: M) -> Result<Self, GraphError> {
        cfg.validate()?;
        Ok(Self::empty(cfg, merger))
    }

    fn empty(cfg: AggregatorConfig, merger: M) -> Self {
        Self {
            cfg,
            merger,
            partials: HashMap::new(),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.cfg
    }

    /// Distinct vertices seen so far.
    pub fn len(&self) -> usize {
        self.partials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }

    pub fn push(&mut self, fragment: VertexFragment<V, P>) -> Result<(), GraphError> {
        match fragment {
            VertexFragment::Touch(t) => self.push_touch(t),
            VertexFragment::Payload { vertex, payload } => self.push_payload(vertex, payload),
        }
    }

    pub fn push_touch(&mut self, touch: EdgeTouch<V>) -> Result<(), GraphError> {
        if touch.partition >= self.cfg.num_procs {
            return Err(GraphError::InvalidPartition {
                partition: touch.partition,
                num_procs: self.cfg.num_procs,
            });
        }
        slot(&mut self.partials, &touch.vertex, self.cfg.num_procs).absorb_touch(&touch);
        Ok(())
    }

    pub fn push_payload(&mut self, vertex: V, payload: P) -> Result<(), GraphError> {
        slot(&mut self.partials, &vertex, self.cfg.num_procs)
            .absorb_payload(payload, &self.merger)
            .map_err(|_| GraphError::PayloadNotMergeable(format!("{vertex:?}")))
    }

    pub fn extend<I>(&mut self, fragments: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = VertexFragment<V, P>>,
    {
        fragments.into_iter().try_for_each(|f| self.push(f))
    }

    /// Folds another partial aggregation into this one.
    ///
    /// Every vertex of `other` is folded in even when a payload merge is
    /// refused; the refused payload is dropped, the one already held is kept,
    /// and the first such vertex is reported.
    pub fn merge(&mut self, other: Self) -> Result<(), GraphError> {
        if other.cfg.num_procs != self.cfg.num_procs {
            return Err(GraphError::InvalidNumProcs(other.cfg.num_procs));
        }
        let (mut into, from) = if self.partials.len() >= other.partials.len() {
            (std::mem::take(&mut self.partials), other.partials)
        } else {
            (other.partials, std::mem::take(&mut self.partials))
        };
        let mut result = Ok(());
        for (v, partial) in from {
            match into.get_mut(&v) {
                Some(existing) => {
                    if existing.combine(partial, &self.merger).is_err() && result.is_ok() {
                        result = Err(GraphError::PayloadNotMergeable(format!("{v:?}")));
                    }
                }
                None => {
                    into.insert(v, partial);
                }
            }
        }
        self.partials = into;
        result
    }

    /// Elects owners and emits one record per vertex, sorted by vertex id.
    pub fn finish(self) -> Vec<VertexRecord<V, P>>
    where
        P: Send,
    {
        let n = self.cfg.num_procs;
        let seed = self.cfg.rng_seed;
        let partials: Vec<(V, PartialVertexRecord<P>)> = self.partials.into_iter().collect();
        let mut records: Vec<VertexRecord<V, P>> = partials
            .into_par_iter()
            .map(|(v, partial)| {
                let mut rng = keyed_rng(seed, &v);
                partial.elect(v, n, &mut rng)
            })
            .collect();
        records.par_sort_unstable_by(|a, b| a.vertex.cmp(&b.vertex));
        log::debug!("aggregated {} vertex records over {n} partitions", records.len());
        records
    }
}

/// The accumulator for `v`, created empty on first sight.
fn slot<'a, V: VertexLike, P>(
    partials: &'a mut HashMap<V, PartialVertexRecord<P>>,
    v: &V,
    num_procs: usize,
) -> &'a mut PartialVertexRecord<P> {
    partials
        .raw_entry_mut()
        .from_key(v)
        .or_insert_with(|| (v.clone(), PartialVertexRecord::empty(num_procs)))
        .1
}

/// Aggregates `fragments` with a rayon fold/reduce tree.
pub fn aggregate_parallel<V, P, M>(
    fragments: Vec<VertexFragment<V, P>>,
    cfg: &AggregatorConfig,
    merger: M,
) -> Result<Vec<VertexRecord<V, P>>, GraphError>
where
    V: VertexLike,
    P: Send,
    M: PayloadMerge<P> + Clone + Send + Sync,
{
    cfg.validate()?;
    let identity = || VertexRecordAggregator::empty(cfg.clone(), merger.clone());
    let merged = fragments
        .into_par_iter()
        .try_fold(identity, |mut agg, f| agg.push(f).map(|_| agg))
        .try_reduce(identity, |mut a, b| a.merge(b).map(|_| a))?;
    Ok(merged.finish())
}
