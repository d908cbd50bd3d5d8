//! Shared fixtures for router integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use shardwrap_router::{
    sharded_dao, BucketId, BucketIdExtractor, ConstructionError, InvalidKeyError, SessionError,
    SessionProvider, ShardId, ShardManager, ShardedDao, TransactionError, UnitOfWork,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Lifecycle calls observed by a provider
#[derive(Debug, Default)]
pub struct Counters {
    pub begins: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
}

impl Counters {
    pub fn snapshot(&self) -> (usize, usize, usize) {
        (
            self.begins.load(Ordering::SeqCst),
            self.commits.load(Ordering::SeqCst),
            self.rollbacks.load(Ordering::SeqCst),
        )
    }
}

/// Session provider that counts lifecycle calls and remembers read-only opens
#[derive(Debug, Clone, Default)]
pub struct CountingProvider {
    pub counters: Arc<Counters>,
    pub read_only_opens: Arc<Mutex<Vec<bool>>>,
}

pub struct CountingSession {
    counters: Arc<Counters>,
}

impl SessionProvider for CountingProvider {
    type Session = CountingSession;

    fn open(&self, read_only: bool) -> Result<CountingSession, SessionError> {
        self.read_only_opens.lock().push(read_only);
        Ok(CountingSession {
            counters: self.counters.clone(),
        })
    }
}

impl UnitOfWork for CountingSession {
    fn begin(&mut self) -> Result<(), SessionError> {
        self.counters.begins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SessionError> {
        self.counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SessionError> {
        self.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fixed key → bucket table
pub struct FixedBuckets(pub HashMap<&'static str, BucketId>);

impl BucketIdExtractor<str> for FixedBuckets {
    fn bucket_id(&self, key: &str) -> Result<BucketId, InvalidKeyError> {
        self.0
            .get(key)
            .copied()
            .ok_or_else(|| InvalidKeyError::new(key, "unknown key"))
    }
}

/// Bucket id modulo shard count
pub struct ModuloShards(pub usize);

impl ShardManager for ModuloShards {
    fn shard_count(&self) -> usize {
        self.0
    }

    fn shard_for_bucket(&self, bucket: BucketId) -> ShardId {
        bucket as usize % self.0
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum InventoryError {
    #[error("sku {0} is out of stock")]
    OutOfStock(String),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// Extra constructor parameters
#[derive(Debug, Clone, Default)]
pub struct InventoryParams {
    /// Bumped on every DAO construction
    pub built: Arc<AtomicUsize>,
    /// Optional table name per shard; an empty name is malformed
    pub tables: Vec<String>,
}

pub struct Inventory {
    pub shard: ShardId,
    pub table: String,
}

impl ShardedDao for Inventory {
    type Provider = CountingProvider;
    type Params = InventoryParams;

    fn construct(
        shard: ShardId,
        _provider: Arc<CountingProvider>,
        params: &InventoryParams,
    ) -> Result<Self, ConstructionError> {
        let table = match params.tables.get(shard) {
            Some(name) if name.is_empty() => {
                return Err(ConstructionError::new(format!(
                    "empty table name for shard {}",
                    shard
                )))
            }
            Some(name) => name.clone(),
            None => format!("inventory_{}", shard),
        };
        params.built.fetch_add(1, Ordering::SeqCst);
        Ok(Self { shard, table })
    }
}

sharded_dao! {
    /// Stock operations
    pub trait InventoryDao for Inventory {
        #[transactional(read_only = true)]
        fn stock(&self, sku: &str) -> Result<u32, InventoryError>;
        #[transactional]
        fn reserve(&self, sku: &str, quantity: u32) -> Result<u32, InventoryError>;
        fn peek(&self, sku: &str) -> Result<u32, InventoryError>;
        fn table(&self) -> String;
    }
}

impl InventoryDao for Inventory {
    fn stock(&self, sku: &str) -> Result<u32, InventoryError> {
        if sku.starts_with("gone") {
            return Err(InventoryError::OutOfStock(sku.to_string()));
        }
        Ok(10)
    }

    fn reserve(&self, sku: &str, quantity: u32) -> Result<u32, InventoryError> {
        let available = self.stock(sku)?;
        Ok(available.saturating_sub(quantity))
    }

    fn peek(&self, sku: &str) -> Result<u32, InventoryError> {
        self.stock(sku)
    }

    fn table(&self) -> String {
        self.table.clone()
    }
}
