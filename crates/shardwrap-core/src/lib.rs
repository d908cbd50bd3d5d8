//! Shardwrap Core - Shared routing capabilities
//!
//! This crate provides the pieces that sit underneath the wrapper router:
//! bucket extraction, bucket-to-shard mapping and the sharding configuration.

pub mod config;
pub mod error;
pub mod shard;

pub use config::{ShardEndpoint, ShardingConfig};
pub use error::{ConfigError, InvalidKeyError};
pub use shard::{
    BalancedShardManager, BucketId, BucketIdExtractor, HashBucketIdExtractor, ShardId,
    ShardManager, DEFAULT_BUCKET_COUNT,
};
