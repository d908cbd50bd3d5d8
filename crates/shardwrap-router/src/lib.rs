//! Shardwrap Router - Sharded DAO routing with transactional interception
//!
//! Routes every operation for a partition key to one shard's DAO, and runs the
//! operations that DAO declares transactional inside a unit of work.
//!
//! # Architecture
//!
//! ```text
//! caller
//!     │ for_parent(key)
//!     ▼
//! ┌─────────────────────────┐
//! │     WrapperRouter       │  One pre-built wrapper per shard
//! │   (Which shard?)        │  ◄── ShardCalculator (extractor + manager)
//! └───────────┬─────────────┘
//!             │ &DaoProxy<Dao>
//!             ▼
//! ┌─────────────────────────┐
//! │       DaoProxy          │  Declared? begin / commit / rollback
//! │   (Which lifecycle?)    │  ◄── TransactionHandler (per call)
//! └───────────┬─────────────┘
//!             ▼
//!         real DAO
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use shardwrap_router::{sharded_dao, WrapperRouter};
//!
//! sharded_dao! {
//!     pub trait AccountDao for AccountStore {
//!         #[transactional]
//!         fn deposit(&self, account: &str, amount: i64) -> Result<i64, StoreError>;
//!     }
//! }
//!
//! let router = WrapperRouter::<AccountStore>::new(providers, shard_manager, extractor)?;
//! router.for_parent("user-1")?.deposit("user-1", 100)?;
//! ```

// Core modules
mod error;
mod session;
mod types;

// Routing and interception
mod calculator;
mod macros;
mod proxy;
mod transaction;
mod wrapper_router;

#[cfg(test)]
mod test_support;

// Re-exports: Error types
pub use error::{ConstructionError, RouterError, SessionError, TransactionError};

// Re-exports: Core types
pub use types::{DeclarationTable, TransactionState, TransactionalDeclaration};

// Re-exports: Session capabilities
pub use session::{SessionProvider, UnitOfWork};

// Re-exports: Routing
pub use calculator::ShardCalculator;
pub use proxy::{DaoProxy, DeclaredOperations, ShardedDao};
pub use transaction::TransactionHandler;
pub use wrapper_router::WrapperRouter;

pub use shardwrap_core::{
    BalancedShardManager, BucketId, BucketIdExtractor, HashBucketIdExtractor, InvalidKeyError,
    ShardId, ShardManager,
};
