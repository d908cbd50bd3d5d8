//! Account DAO backed by [`MemoryProvider`]
//!
//! Accounts are keyed `<parent>:<name>`, so every account of one parent lives
//! on the parent's shard and moves between them never cross shards.

use shardwrap_router::{
    sharded_dao, ConstructionError, SessionError, ShardId, ShardedDao, TransactionError,
};
use std::sync::Arc;
use thiserror::Error;

use crate::memory::MemoryProvider;

/// Account operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Account not found: {0}")]
    UnknownAccount(String),

    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("Insufficient funds in {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: String,
        balance: i64,
        requested: i64,
    },

    #[error("Balance of {account} would overflow after adding {amount}")]
    Overflow { account: String, amount: i64 },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// Extra constructor parameters for [`AccountStore`]
#[derive(Debug, Clone, Default)]
pub struct AccountParams {
    /// How far below zero a balance may go
    pub overdraft_limit: i64,
}

/// Real account DAO for one shard
#[derive(Debug)]
pub struct AccountStore {
    shard: ShardId,
    provider: Arc<MemoryProvider>,
    overdraft_limit: i64,
}

impl ShardedDao for AccountStore {
    type Provider = MemoryProvider;
    type Params = AccountParams;

    fn construct(
        shard: ShardId,
        provider: Arc<MemoryProvider>,
        params: &AccountParams,
    ) -> Result<Self, ConstructionError> {
        if params.overdraft_limit < 0 {
            return Err(ConstructionError::new(format!(
                "overdraft limit must not be negative, got {}",
                params.overdraft_limit
            )));
        }
        Ok(Self {
            shard,
            provider,
            overdraft_limit: params.overdraft_limit,
        })
    }
}

sharded_dao! {
    /// Account operations, routed by parent key
    pub trait AccountDao for AccountStore {
        #[transactional]
        fn open_account(&self, account: &str, initial: i64) -> Result<i64, StoreError>;
        #[transactional(read_only = true)]
        fn balance(&self, account: &str) -> Result<i64, StoreError>;
        #[transactional]
        fn deposit(&self, account: &str, amount: i64) -> Result<i64, StoreError>;
        #[transactional]
        fn withdraw(&self, account: &str, amount: i64) -> Result<i64, StoreError>;
        #[transactional]
        fn transfer(&self, from: &str, to: &str, amount: i64) -> Result<(), StoreError>;
        fn committed_balance(&self, account: &str) -> Option<i64>;
        fn home_shard(&self) -> ShardId;
    }
}

impl AccountStore {
    fn existing(&self, account: &str) -> Result<i64, StoreError> {
        self.provider
            .read(account)
            .ok_or_else(|| StoreError::UnknownAccount(account.to_string()))
    }

    fn positive(amount: i64) -> Result<i64, StoreError> {
        if amount <= 0 {
            return Err(StoreError::InvalidAmount(amount));
        }
        Ok(amount)
    }
}

impl AccountDao for AccountStore {
    fn open_account(&self, account: &str, initial: i64) -> Result<i64, StoreError> {
        if self.provider.read(account).is_some() {
            return Err(StoreError::DuplicateAccount(account.to_string()));
        }
        if initial < 0 {
            return Err(StoreError::InvalidAmount(initial));
        }
        self.provider.write(account, initial)?;
        Ok(initial)
    }

    fn balance(&self, account: &str) -> Result<i64, StoreError> {
        self.existing(account)
    }

    fn deposit(&self, account: &str, amount: i64) -> Result<i64, StoreError> {
        let amount = Self::positive(amount)?;
        let balance = self
            .existing(account)?
            .checked_add(amount)
            .ok_or_else(|| StoreError::Overflow {
                account: account.to_string(),
                amount,
            })?;
        self.provider.write(account, balance)?;
        Ok(balance)
    }

    fn withdraw(&self, account: &str, amount: i64) -> Result<i64, StoreError> {
        let amount = Self::positive(amount)?;
        let balance = self.existing(account)?;
        let remaining = balance
            .checked_sub(amount)
            .filter(|remaining| *remaining >= -self.overdraft_limit)
            .ok_or_else(|| StoreError::InsufficientFunds {
                account: account.to_string(),
                balance,
                requested: amount,
            })?;
        self.provider.write(account, remaining)?;
        Ok(remaining)
    }

    // Withdraws first; a missing destination leaves the debit staged until rollback.
    fn transfer(&self, from: &str, to: &str, amount: i64) -> Result<(), StoreError> {
        self.withdraw(from, amount)?;
        self.deposit(to, amount)?;
        Ok(())
    }

    fn committed_balance(&self, account: &str) -> Option<i64> {
        self.provider.snapshot().get(account).copied()
    }

    fn home_shard(&self) -> ShardId {
        self.shard
    }
}
