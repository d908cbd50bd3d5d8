//! Shardwrap Demo - Sharded account ledger
//!
//! Wires the wrapper router to in-memory shards:
//! - Builds one [`MemoryProvider`] per configured shard
//! - Routes every customer's accounts to one shard by customer id
//! - Runs account operations through the intercepting wrappers

pub mod accounts;
pub mod memory;

pub use accounts::{AccountDao, AccountParams, AccountStore, StoreError};
pub use memory::MemoryProvider;

use shardwrap_core::{BalancedShardManager, HashBucketIdExtractor, ShardingConfig};
use shardwrap_router::{RouterError, WrapperRouter};
use std::sync::Arc;
use tracing::{info, warn};

/// Build a router over fresh in-memory shards described by `config`
pub fn build_router(
    config: &ShardingConfig,
    params: AccountParams,
) -> Result<WrapperRouter<AccountStore>, RouterError> {
    config.validate()?;

    let providers: Vec<MemoryProvider> = config
        .shards
        .iter()
        .map(|shard| MemoryProvider::new(shard.name.clone()))
        .collect();
    let shard_manager =
        BalancedShardManager::with_bucket_count(config.shard_count(), config.bucket_count)?;
    let extractor = HashBucketIdExtractor::with_bucket_count(config.bucket_count)?;

    WrapperRouter::<AccountStore>::with_params(
        providers,
        Arc::new(shard_manager),
        Arc::new(extractor),
        params,
    )
}

/// Outcome of [`run_workload`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkloadSummary {
    /// Customers routed to each shard, in shard order
    pub customers_per_shard: Vec<usize>,
    pub committed_transfers: usize,
    pub rejected_transfers: usize,
}

/// Open two accounts per customer and move money between them
///
/// Every third customer attempts an overdraft, which the router rolls back.
pub fn run_workload(
    router: &WrapperRouter<AccountStore>,
    customers: usize,
) -> Result<WorkloadSummary, RouterError> {
    let mut summary = WorkloadSummary {
        customers_per_shard: vec![0; router.shard_count()],
        ..Default::default()
    };

    for i in 0..customers {
        let customer = format!("customer-{}", i);
        let accounts = router.for_parent(&customer)?;
        summary.customers_per_shard[accounts.shard()] += 1;

        let checking = format!("{}:checking", customer);
        let savings = format!("{}:savings", customer);
        if let Err(e) = accounts
            .open_account(&checking, 100)
            .and_then(|_| accounts.open_account(&savings, 0))
        {
            warn!(customer = %customer, error = %e, "Failed to open accounts");
            continue;
        }

        let amount = if i % 3 == 0 { 500 } else { 40 };
        match accounts.transfer(&checking, &savings, amount) {
            Ok(()) => summary.committed_transfers += 1,
            Err(e) => {
                info!(customer = %customer, error = %e, "Transfer rolled back");
                summary.rejected_transfers += 1;
            }
        }
    }

    Ok(summary)
}
