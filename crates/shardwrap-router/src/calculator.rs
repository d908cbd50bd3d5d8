//! Shard Calculator
//!
//! Composes a bucket extractor and a shard manager into `key → shard index`.

use shardwrap_core::{BucketIdExtractor, InvalidKeyError, ShardId, ShardManager};
use std::sync::Arc;
use tracing::trace;

use crate::error::RouterError;

/// Stateless key → shard mapping over a fixed shard count
#[derive(Clone)]
pub struct ShardCalculator {
    shard_manager: Arc<dyn ShardManager>,
    bucket_extractor: Arc<dyn BucketIdExtractor<str>>,
    shard_count: usize,
}

impl ShardCalculator {
    pub fn new(
        shard_manager: Arc<dyn ShardManager>,
        bucket_extractor: Arc<dyn BucketIdExtractor<str>>,
        shard_count: usize,
    ) -> Self {
        Self {
            shard_manager,
            bucket_extractor,
            shard_count,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    /// Route a partition key to its shard
    pub fn shard_index(&self, key: &str) -> Result<ShardId, RouterError> {
        if key.is_empty() {
            return Err(InvalidKeyError::new(key, "partition key is empty").into());
        }

        let bucket = self.bucket_extractor.bucket_id(key)?;
        let index = self.shard_manager.shard_for_bucket(bucket);
        if index >= self.shard_count {
            return Err(RouterError::ShardUnavailable {
                index,
                shard_count: self.shard_count,
            });
        }

        trace!(key = %key, bucket, shard = index, "Routed partition key");
        Ok(index)
    }
}

impl std::fmt::Debug for ShardCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardCalculator")
            .field("shard_count", &self.shard_count)
            .finish()
    }
}
