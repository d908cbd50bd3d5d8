//! Intercepting DAO wrapper
//!
//! A [`DaoProxy`] owns one shard's real DAO together with that shard's
//! session provider. Every call made through it is checked against the DAO
//! type's [`DeclarationTable`]:
//!
//! ```text
//! invoke(op, call)
//!     │
//!     ▼
//! op declared? ──No──► call(dao)            (no lifecycle at all)
//!     │
//!    Yes
//!     ▼
//! before_start(read_only) ──► call(dao) ──Ok──► after_end ──► result
//!                                  │
//!                                 Err
//!                                  ▼
//!                              on_error ──► original error
//! ```
//!
//! The `sharded_dao!` macro generates the declaration table and a trait
//! implementation for `DaoProxy<Real>` that routes each method through the
//! right path, so callers use the proxy exactly like the real DAO.

use shardwrap_core::ShardId;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::error::{ConstructionError, RouterError, TransactionError};
use crate::session::SessionProvider;
use crate::transaction::TransactionHandler;
use crate::types::DeclarationTable;

/// Static table of transactional operations for a DAO type
pub trait DeclaredOperations {
    /// Operations that run inside a unit of work. Defaults to none.
    fn declarations() -> DeclarationTable {
        DeclarationTable::new()
    }
}

/// A data-access object that can be built once per shard
pub trait ShardedDao: DeclaredOperations + Sized + Send + Sync {
    /// Session provider the DAO works against
    type Provider: SessionProvider;

    /// Extra constructor parameters, shared by every shard
    type Params;

    /// Build the real DAO for `shard`
    fn construct(
        shard: ShardId,
        provider: Arc<Self::Provider>,
        params: &Self::Params,
    ) -> Result<Self, ConstructionError>;
}

/// Intercepting wrapper around one shard's DAO
pub struct DaoProxy<D: ShardedDao> {
    shard: ShardId,
    provider: Arc<D::Provider>,
    dao: D,
    declarations: DeclarationTable,
}

impl<D: ShardedDao> DaoProxy<D> {
    /// Construct the real DAO and wrap it
    ///
    /// Fails with [`RouterError::Construction`] if the DAO rejects its inputs.
    pub fn build(
        shard: ShardId,
        provider: Arc<D::Provider>,
        params: &D::Params,
    ) -> Result<Self, RouterError> {
        let dao = D::construct(shard, provider.clone(), params)
            .map_err(|source| RouterError::Construction { shard, source })?;
        let declarations = D::declarations();

        debug!(
            shard,
            transactional_operations = declarations.len(),
            "Built intercepting wrapper"
        );

        Ok(Self {
            shard,
            provider,
            dao,
            declarations,
        })
    }

    pub fn shard(&self) -> ShardId {
        self.shard
    }

    pub fn declarations(&self) -> &DeclarationTable {
        &self.declarations
    }

    /// Run `call` against the real DAO, inside a unit of work if `operation` is declared
    ///
    /// Errors returned by `call` reach the caller unchanged after rollback.
    /// Lifecycle failures are converted through `From<TransactionError>`.
    pub fn invoke<T, E, F>(&self, operation: &'static str, call: F) -> Result<T, E>
    where
        F: FnOnce(&D) -> Result<T, E>,
        E: From<TransactionError>,
    {
        let declaration = match self.declarations.get(operation) {
            Some(declaration) => declaration,
            None => {
                trace!(shard = self.shard, operation, "Non-transactional call");
                return call(&self.dao);
            }
        };

        let mut handler = TransactionHandler::new(&*self.provider, self.shard);
        if let Err(e) = handler.before_start(declaration.read_only) {
            warn!(shard = self.shard, operation, error = %e, "Failed to start unit of work");
            handler.on_error();
            return Err(e.into());
        }

        match call(&self.dao) {
            Ok(result) => match handler.after_end() {
                Ok(()) => Ok(result),
                Err(e) => {
                    warn!(shard = self.shard, operation, error = %e, "Commit failed, rolling back");
                    handler.on_error();
                    Err(e.into())
                }
            },
            Err(e) => {
                debug!(shard = self.shard, operation, "Operation failed, rolling back");
                handler.on_error();
                Err(e)
            }
        }
    }

    /// Run `call` against the real DAO with no transaction lifecycle
    pub fn passthrough<R, F>(&self, call: F) -> R
    where
        F: FnOnce(&D) -> R,
    {
        call(&self.dao)
    }
}

impl<D: ShardedDao> std::fmt::Debug for DaoProxy<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaoProxy")
            .field("shard", &self.shard)
            .field("declarations", &self.declarations)
            .finish()
    }
}
