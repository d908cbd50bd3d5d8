//! Wrapper Router
//!
//! Holds one intercepting wrapper per shard, built eagerly and in provider
//! order, and hands out the wrapper that owns a partition key.
//!
//! ```text
//! for_parent("user-1")
//!        │
//!        ▼
//! ShardCalculator ──► shard 2 ──► wrappers[2] (built at construction)
//! ```
//!
//! Extra constructor parameters are handed to every shard's DAO constructor.

use shardwrap_core::{BucketIdExtractor, ShardId, ShardManager};
use std::sync::Arc;
use tracing::info;

use crate::calculator::ShardCalculator;
use crate::error::RouterError;
use crate::proxy::{DaoProxy, ShardedDao};

/// Routes partition keys to pre-built per-shard DAO wrappers
pub struct WrapperRouter<D: ShardedDao> {
    wrappers: Vec<DaoProxy<D>>,
    calculator: ShardCalculator,
}

impl<D: ShardedDao> WrapperRouter<D> {
    /// Create with default extra parameters
    pub fn new(
        providers: Vec<D::Provider>,
        shard_manager: Arc<dyn ShardManager>,
        bucket_extractor: Arc<dyn BucketIdExtractor<str>>,
    ) -> Result<Self, RouterError>
    where
        D::Params: Default,
    {
        Self::with_params(providers, shard_manager, bucket_extractor, Default::default())
    }

    /// Create, passing `params` to every shard's DAO constructor
    ///
    /// Construction is all-or-nothing: the first shard that fails to build
    /// aborts the router.
    pub fn with_params(
        providers: Vec<D::Provider>,
        shard_manager: Arc<dyn ShardManager>,
        bucket_extractor: Arc<dyn BucketIdExtractor<str>>,
        params: D::Params,
    ) -> Result<Self, RouterError> {
        if providers.is_empty() {
            return Err(RouterError::InvalidConfig(
                "at least one session provider is required".to_string(),
            ));
        }
        if shard_manager.shard_count() != providers.len() {
            return Err(RouterError::InvalidConfig(format!(
                "shard manager expects {} shards but {} providers were given",
                shard_manager.shard_count(),
                providers.len()
            )));
        }

        let wrappers = providers
            .into_iter()
            .enumerate()
            .map(|(shard, provider)| DaoProxy::<D>::build(shard, Arc::new(provider), &params))
            .collect::<Result<Vec<_>, _>>()?;

        let calculator = ShardCalculator::new(shard_manager, bucket_extractor, wrappers.len());
        info!(shard_count = wrappers.len(), "Wrapper router ready");

        Ok(Self {
            wrappers,
            calculator,
        })
    }

    /// The wrapper that owns `key`'s shard
    pub fn for_parent(&self, key: &str) -> Result<&DaoProxy<D>, RouterError> {
        let shard = self.calculator.shard_index(key)?;
        self.wrappers
            .get(shard)
            .ok_or(RouterError::ShardUnavailable {
                index: shard,
                shard_count: self.wrappers.len(),
            })
    }

    /// Routing decision for `key`
    pub fn shard_for(&self, key: &str) -> Result<ShardId, RouterError> {
        self.calculator.shard_index(key)
    }

    /// Wrapper by shard index
    pub fn for_shard(&self, shard: ShardId) -> Option<&DaoProxy<D>> {
        self.wrappers.get(shard)
    }

    pub fn shard_count(&self) -> usize {
        self.wrappers.len()
    }

    /// All wrappers, in shard order
    pub fn wrappers(&self) -> impl Iterator<Item = &DaoProxy<D>> {
        self.wrappers.iter()
    }
}

impl<D: ShardedDao> std::fmt::Debug for WrapperRouter<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrapperRouter")
            .field("wrappers", &self.wrappers)
            .field("calculator", &self.calculator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstructionError;
    use crate::proxy::DeclaredOperations;
    use crate::test_support::RecordingProvider;
    use shardwrap_core::{BalancedShardManager, HashBucketIdExtractor};

    struct Probe {
        shard: ShardId,
    }

    impl DeclaredOperations for Probe {}

    impl ShardedDao for Probe {
        type Provider = RecordingProvider;
        type Params = Option<ShardId>;

        // `Some(n)` makes shard `n` refuse to build
        fn construct(
            shard: ShardId,
            _provider: Arc<RecordingProvider>,
            broken: &Option<ShardId>,
        ) -> Result<Self, ConstructionError> {
            if *broken == Some(shard) {
                return Err(ConstructionError::new("probe misconfigured"));
            }
            Ok(Self { shard })
        }
    }

    fn providers(count: usize) -> Vec<RecordingProvider> {
        (0..count).map(|_| RecordingProvider::new()).collect()
    }

    fn router(count: usize) -> Result<WrapperRouter<Probe>, RouterError> {
        WrapperRouter::new(
            providers(count),
            Arc::new(BalancedShardManager::new(count).unwrap()),
            Arc::new(HashBucketIdExtractor::new()),
        )
    }

    #[test]
    fn test_wrappers_follow_provider_order() {
        let router = router(3).unwrap();

        assert_eq!(router.shard_count(), 3);
        for (index, wrapper) in router.wrappers().enumerate() {
            assert_eq!(wrapper.shard(), index);
            assert_eq!(wrapper.passthrough(|probe| probe.shard), index);
        }
    }

    #[test]
    fn test_for_parent_matches_shard_for() {
        let router = router(4).unwrap();

        for i in 0..50 {
            let key = format!("tenant-{}", i);
            let shard = router.shard_for(&key).unwrap();
            assert_eq!(router.for_parent(&key).unwrap().shard(), shard);
        }
    }

    #[test]
    fn test_same_key_same_wrapper() {
        let router = router(4).unwrap();

        let first = router.for_parent("tenant-7").unwrap();
        let second = router.for_parent("tenant-7").unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_invalid_key() {
        let router = router(2).unwrap();
        assert!(matches!(
            router.for_parent(""),
            Err(RouterError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_for_shard_out_of_range() {
        let router = router(2).unwrap();
        assert!(router.for_shard(1).is_some());
        assert!(router.for_shard(2).is_none());
    }

    #[test]
    fn test_no_providers() {
        let err = WrapperRouter::<Probe>::new(
            Vec::new(),
            Arc::new(BalancedShardManager::new(1).unwrap()),
            Arc::new(HashBucketIdExtractor::new()),
        )
        .unwrap_err();
        assert!(matches!(err, RouterError::InvalidConfig(_)));
    }

    #[test]
    fn test_shard_count_mismatch() {
        let err = WrapperRouter::<Probe>::new(
            providers(3),
            Arc::new(BalancedShardManager::new(4).unwrap()),
            Arc::new(HashBucketIdExtractor::new()),
        )
        .unwrap_err();
        assert!(matches!(err, RouterError::InvalidConfig(_)));
    }

    #[test]
    fn test_construction_is_all_or_nothing() {
        let err = WrapperRouter::<Probe>::with_params(
            providers(4),
            Arc::new(BalancedShardManager::new(4).unwrap()),
            Arc::new(HashBucketIdExtractor::new()),
            Some(2),
        )
        .unwrap_err();

        assert!(matches!(err, RouterError::Construction { shard: 2, .. }));
    }
}
