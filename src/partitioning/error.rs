//! Ingress configuration and assignment errors

use super::PartitionId;
use thiserror::Error;

/// Errors from ingress strategy construction and edge assignment
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngressError {
    /// The algorithm name is not one of the supported selectors
    #[error("unknown ingress algorithm `{0}`")]
    UnknownAlgorithm(String),
    /// Partition count must be at least one
    #[error("number of partitions must be positive, got {0}")]
    InvalidNumProcs(usize),
    /// Two master partitions have disjoint neighborhoods; the constraint graph is broken
    #[error("no candidate partitions for masters {source_master} and {target_master}")]
    EmptyCandidateSet {
        source_master: PartitionId,
        target_master: PartitionId,
    },
}
