//! Configuration module for sharded deployments

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::shard::DEFAULT_BUCKET_COUNT;

/// Default number of shards
pub const DEFAULT_SHARD_COUNT: usize = 2;

/// Sharding configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardingConfig {
    /// One entry per shard, in shard index order
    pub shards: Vec<ShardEndpoint>,

    /// Size of the bucket space keys are hashed into
    #[serde(default = "default_bucket_count")]
    pub bucket_count: u32,
}

/// A single backing store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardEndpoint {
    /// Human-readable name, used in logs
    pub name: String,
}

fn default_bucket_count() -> u32 {
    DEFAULT_BUCKET_COUNT
}

impl ShardEndpoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ShardingConfig {
    fn default() -> Self {
        Self::with_shard_count(DEFAULT_SHARD_COUNT)
    }
}

impl ShardingConfig {
    /// Config with `count` shards named `shard-0`, `shard-1`, ...
    pub fn with_shard_count(count: usize) -> Self {
        Self {
            shards: (0..count)
                .map(|i| ShardEndpoint::new(format!("shard-{}", i)))
                .collect(),
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// `SHARD_NAMES` (comma separated) wins over `SHARD_COUNT` when both are set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ShardingConfig::default();

        // Bucket space
        if let Some(buckets) = lookup("BUCKET_COUNT") {
            config.bucket_count = buckets.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "BUCKET_COUNT".to_string(),
                value: buckets.clone(),
            })?;
        }
        if config.bucket_count == 0 {
            return Err(ConfigError::EmptyBucketSpace);
        }

        // Shard names
        let names: Vec<ShardEndpoint> = lookup("SHARD_NAMES")
            .map(|names| {
                names
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(ShardEndpoint::new)
                    .collect()
            })
            .unwrap_or_default();

        // Shard count, bounded before any endpoint is allocated
        if !names.is_empty() {
            config.shards = names;
        } else if let Some(count) = lookup("SHARD_COUNT") {
            let parsed: usize = count.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "SHARD_COUNT".to_string(),
                value: count.clone(),
            })?;
            let max = config.bucket_count as usize;
            if parsed == 0 || parsed > max {
                return Err(ConfigError::InvalidShardCount { count: parsed, max });
            }
            config.shards = ShardingConfig::with_shard_count(parsed).shards;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let to_error = |reason: String| ConfigError::File {
            path: path.display().to_string(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| to_error(e.to_string()))?;
        let config: ShardingConfig =
            serde_json::from_str(&raw).map_err(|e| to_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check shard count against the bucket space
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_count == 0 {
            return Err(ConfigError::EmptyBucketSpace);
        }
        let count = self.shard_count();
        if count == 0 || count > self.bucket_count as usize {
            return Err(ConfigError::InvalidShardCount {
                count,
                max: self.bucket_count as usize,
            });
        }
        Ok(())
    }
}
