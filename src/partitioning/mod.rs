//! Entry-point for streaming vertex-cut partitioning.
//!
//! [`build_ingress`] turns an [`IngressConfig`] into a boxed
//! [`IngressStrategy`]. Unknown algorithm names and zero partition counts are
//! rejected here, before any edge flows.

pub mod constraint;
pub mod error;
pub mod hashing;
pub mod ingress;
pub mod metrics;
pub mod partition_set;
pub mod pds;

pub use self::constraint::{ConstraintGraph, ConstraintKind};
pub use self::error::IngressError;
pub use self::ingress::{
    assign_edge, ConstrainedGreedyIngress, ConstrainedRandomIngress, EdgeAssignment,
    GreedyIngress, IngressStrategy, RandomIngress,
};
pub use self::metrics::*;
pub use self::partition_set::PartitionSet;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

pub type PartitionId = usize;

/// Edge placement algorithm selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngressAlgorithm {
    Random,
    Greedy,
    ConstrainedRandom,
    ConstrainedGreedy,
    ConstrainedPdsRandom,
}

impl IngressAlgorithm {
    pub const ALL: [IngressAlgorithm; 5] = [
        IngressAlgorithm::Random,
        IngressAlgorithm::Greedy,
        IngressAlgorithm::ConstrainedRandom,
        IngressAlgorithm::ConstrainedGreedy,
        IngressAlgorithm::ConstrainedPdsRandom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IngressAlgorithm::Random => "random",
            IngressAlgorithm::Greedy => "greedy",
            IngressAlgorithm::ConstrainedRandom => "constrainedrandom",
            IngressAlgorithm::ConstrainedGreedy => "constrainedgreedy",
            IngressAlgorithm::ConstrainedPdsRandom => "constrainedpdsrandom",
        }
    }

    /// Whether results depend on the order of prior calls.
    pub fn is_stateful(self) -> bool {
        matches!(
            self,
            IngressAlgorithm::Greedy | IngressAlgorithm::ConstrainedGreedy
        )
    }
}

impl fmt::Display for IngressAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IngressAlgorithm {
    type Err = IngressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| IngressError::UnknownAlgorithm(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngressConfig {
    pub num_procs: usize,
    pub algorithm: IngressAlgorithm,
    /// Seed for greedy tie-breaking.
    pub rng_seed: u64,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            num_procs: 1,
            algorithm: IngressAlgorithm::Random,
            rng_seed: 42,
        }
    }
}

impl IngressConfig {
    pub fn validate(&self) -> Result<(), IngressError> {
        if self.num_procs == 0 {
            return Err(IngressError::InvalidNumProcs(self.num_procs));
        }
        Ok(())
    }
}

/// Constructs the strategy named by `cfg`.
pub fn build_ingress<V>(
    cfg: &IngressConfig,
) -> Result<Box<dyn IngressStrategy<V> + Send>, IngressError>
where
    V: Clone + Eq + Hash + Send + 'static,
{
    cfg.validate()?;
    let n = cfg.num_procs;
    let strategy: Box<dyn IngressStrategy<V> + Send> = match cfg.algorithm {
        IngressAlgorithm::Random => Box::new(RandomIngress::new(n)?),
        IngressAlgorithm::Greedy => Box::new(GreedyIngress::<V>::new(n, cfg.rng_seed)?),
        IngressAlgorithm::ConstrainedRandom => Box::new(ConstrainedRandomIngress::grid(n)?),
        IngressAlgorithm::ConstrainedGreedy => {
            Box::new(ConstrainedGreedyIngress::<V>::new(n, cfg.rng_seed)?)
        }
        IngressAlgorithm::ConstrainedPdsRandom => Box::new(ConstrainedRandomIngress::pds(n)?),
    };
    log::debug!("ingress `{}` over {n} partitions", cfg.algorithm);
    Ok(strategy)
}

/// Like [`build_ingress`], selecting the algorithm by name.
pub fn build_ingress_by_name<V>(
    name: &str,
    num_procs: usize,
    rng_seed: u64,
) -> Result<Box<dyn IngressStrategy<V> + Send>, IngressError>
where
    V: Clone + Eq + Hash + Send + 'static,
{
    let cfg = IngressConfig {
        num_procs,
        algorithm: name.parse()?,
        rng_seed,
    };
    build_ingress(&cfg)
}
