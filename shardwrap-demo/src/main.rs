//! Shardwrap Demo - Main entry point

use shardwrap_core::ShardingConfig;
use shardwrap_demo::{build_router, run_workload, AccountParams};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration from a JSON file if given, else from environment
    let config = match std::env::var("SHARDING_CONFIG") {
        Ok(path) => ShardingConfig::from_json_file(path)?,
        Err(_) => ShardingConfig::from_env()?,
    };
    info!(
        shards = config.shard_count(),
        buckets = config.bucket_count,
        "Loaded sharding configuration"
    );

    let customers = std::env::var("CUSTOMERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(12);

    let router = build_router(&config, AccountParams::default())?;
    let summary = run_workload(&router, customers)?;

    for (shard, count) in summary.customers_per_shard.iter().enumerate() {
        info!(shard = %config.shards[shard].name, customers = count, "Shard usage");
    }
    info!(
        committed = summary.committed_transfers,
        rolled_back = summary.rejected_transfers,
        "Workload finished"
    );

    Ok(())
}
