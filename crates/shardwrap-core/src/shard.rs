//! Shard selection capabilities
//!
//! Routing a partition key is a two step affair:
//!
//! ```text
//! partition key ──► BucketIdExtractor ──► bucket id ──► ShardManager ──► shard index
//! ```
//!
//! Both steps are pure. The bucket space is fixed, so the key → bucket step
//! never changes; the bucket → shard step depends only on the shard count the
//! manager was built with.

use blake3::Hasher;
use tracing::trace;

use crate::error::{ConfigError, InvalidKeyError};

/// Bucket identifier derived from a partition key
pub type BucketId = u32;

/// Shard index in `[0, shard_count)`
pub type ShardId = usize;

/// Default size of the bucket space
pub const DEFAULT_BUCKET_COUNT: u32 = 1000;

/// Derives a bucket id from a key
pub trait BucketIdExtractor<K: ?Sized>: Send + Sync {
    /// Map a key to its bucket. Must be pure.
    fn bucket_id(&self, key: &K) -> Result<BucketId, InvalidKeyError>;
}

/// Maps bucket ids to shard indices for a fixed shard count
pub trait ShardManager: Send + Sync {
    /// Number of shards this manager distributes buckets over
    fn shard_count(&self) -> usize;

    /// Map a bucket to a shard index. Must be pure.
    fn shard_for_bucket(&self, bucket: BucketId) -> ShardId;
}

/// Hash-based extractor over a fixed bucket space
#[derive(Debug, Clone)]
pub struct HashBucketIdExtractor {
    bucket_count: u32,
}

impl HashBucketIdExtractor {
    /// Create with the default bucket space
    pub fn new() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }

    /// Create with a custom bucket space
    pub fn with_bucket_count(bucket_count: u32) -> Result<Self, ConfigError> {
        if bucket_count == 0 {
            return Err(ConfigError::EmptyBucketSpace);
        }
        Ok(Self { bucket_count })
    }

    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// Hash a string key using blake3
    fn hash_key(key: &str) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(key.as_bytes());
        let hash = hasher.finalize();
        let bytes = hash.as_bytes();
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl Default for HashBucketIdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketIdExtractor<str> for HashBucketIdExtractor {
    fn bucket_id(&self, key: &str) -> Result<BucketId, InvalidKeyError> {
        if key.is_empty() {
            return Err(InvalidKeyError::new(key, "partition key is empty"));
        }
        let bucket = Self::hash_key(key) % self.bucket_count;
        trace!(key = %key, bucket, "Extracted bucket");
        Ok(bucket)
    }
}

/// Splits the bucket space into equal contiguous ranges, one per shard
#[derive(Debug, Clone)]
pub struct BalancedShardManager {
    shard_count: usize,
    bucket_count: u32,
}

impl BalancedShardManager {
    /// Create over the default bucket space
    pub fn new(shard_count: usize) -> Result<Self, ConfigError> {
        Self::with_bucket_count(shard_count, DEFAULT_BUCKET_COUNT)
    }

    /// Create over a custom bucket space
    pub fn with_bucket_count(shard_count: usize, bucket_count: u32) -> Result<Self, ConfigError> {
        if bucket_count == 0 {
            return Err(ConfigError::EmptyBucketSpace);
        }
        if shard_count == 0 || shard_count > bucket_count as usize {
            return Err(ConfigError::InvalidShardCount {
                count: shard_count,
                max: bucket_count as usize,
            });
        }
        Ok(Self {
            shard_count,
            bucket_count,
        })
    }

    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }
}

impl ShardManager for BalancedShardManager {
    fn shard_count(&self) -> usize {
        self.shard_count
    }

    // Buckets outside the space land past the last shard; the calculator
    // rejects them.
    fn shard_for_bucket(&self, bucket: BucketId) -> ShardId {
        (bucket as u64 * self.shard_count as u64 / self.bucket_count as u64) as ShardId
    }
}
