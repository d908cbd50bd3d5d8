//! Error types shared by the routing capabilities

use thiserror::Error;

/// A partition key was rejected by a bucket extractor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid partition key {key:?}: {reason}")]
pub struct InvalidKeyError {
    pub key: String,
    pub reason: String,
}

impl InvalidKeyError {
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Shard count is zero or does not fit the bucket space
    #[error("Invalid shard count {count}: must be within 1..={max}")]
    InvalidShardCount { count: usize, max: usize },

    /// Bucket space is empty
    #[error("Bucket count must be positive")]
    EmptyBucketSpace,

    /// Environment variable holds an unparsable value
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },

    /// Config file could not be read or parsed
    #[error("Failed to load config from {path}: {reason}")]
    File { path: String, reason: String },
}
