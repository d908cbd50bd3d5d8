//! Error types for the router module

use shardwrap_core::{ConfigError, InvalidKeyError, ShardId};
use thiserror::Error;

use crate::types::TransactionState;

/// Router error types
#[derive(Debug, Error)]
pub enum RouterError {
    /// Partition key rejected by the bucket extractor
    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyError),

    /// Shard manager mapped a key outside the configured shards
    #[error("Shard unavailable: index {index} is outside 0..{shard_count}")]
    ShardUnavailable { index: usize, shard_count: usize },

    /// A per-shard DAO could not be built
    #[error("Failed to construct DAO for shard {shard}: {source}")]
    Construction {
        shard: ShardId,
        #[source]
        source: ConstructionError,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Returned by a DAO constructor that cannot build itself from its inputs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConstructionError(pub String);

impl ConstructionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Transaction lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Lifecycle operation called from the wrong state
    #[error("Illegal transaction state: cannot {operation} while {state}")]
    IllegalState {
        operation: &'static str,
        state: TransactionState,
    },

    /// The session provider failed
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors reported by a session provider or its unit of work
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Failed to open session: {0}")]
    Open(String),

    #[error("Failed to begin unit of work: {0}")]
    Begin(String),

    #[error("Failed to commit unit of work: {0}")]
    Commit(String),

    #[error("Failed to roll back unit of work: {0}")]
    Rollback(String),

    #[error("Failed to close session: {0}")]
    Close(String),

    /// A data operation ran with no unit of work bound to the caller
    #[error("No active unit of work")]
    NoActiveUnit,

    /// A write was attempted inside a read-only unit of work
    #[error("Unit of work is read-only")]
    ReadOnly,
}
