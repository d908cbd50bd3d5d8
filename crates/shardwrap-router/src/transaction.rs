//! Transaction Handler
//!
//! Drives the lifecycle of one unit of work around exactly one intercepted call.
//!
//! ```text
//!              before_start            after_end
//! NotStarted ───────────────► Started ───────────► Committed
//!      │                         │
//!      │        on_error         │ on_error
//!      └─────────────────────────┴───────────────► RolledBack
//! ```
//!
//! A handler is created per invocation and never reused. Dropping a handler
//! that still holds an open unit of work rolls it back.

use shardwrap_core::ShardId;
use tracing::{debug, warn};

use crate::error::{SessionError, TransactionError};
use crate::session::{SessionProvider, UnitOfWork};
use crate::types::TransactionState;

/// Per-invocation transaction driver bound to one shard's provider
pub struct TransactionHandler<'a, P: SessionProvider> {
    provider: &'a P,
    shard: ShardId,
    read_only: bool,
    state: TransactionState,
    start_attempted: bool,
    session: Option<P::Session>,
    rollback_failure: Option<SessionError>,
}

impl<'a, P: SessionProvider> TransactionHandler<'a, P> {
    pub fn new(provider: &'a P, shard: ShardId) -> Self {
        Self {
            provider,
            shard,
            read_only: false,
            state: TransactionState::NotStarted,
            start_attempted: false,
            session: None,
            rollback_failure: None,
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Failure recorded while rolling back, if any
    pub fn rollback_failure(&self) -> Option<&SessionError> {
        self.rollback_failure.as_ref()
    }

    /// Open and begin the unit of work
    ///
    /// May be called once. If opening or beginning fails the handler stays
    /// `NotStarted`; a session that was opened is kept for [`on_error`](Self::on_error).
    pub fn before_start(&mut self, read_only: bool) -> Result<(), TransactionError> {
        if self.start_attempted || self.state != TransactionState::NotStarted {
            return Err(TransactionError::IllegalState {
                operation: "start",
                state: self.state,
            });
        }
        self.start_attempted = true;
        self.read_only = read_only;

        let mut session = self.provider.open(read_only)?;
        let began = session.begin();
        self.session = Some(session);
        began?;

        self.state = TransactionState::Started;
        debug!(shard = self.shard, read_only, "Unit of work started");
        Ok(())
    }

    /// Commit and release the unit of work
    ///
    /// A failed commit leaves the handler `Started` so it can still be rolled back.
    pub fn after_end(&mut self) -> Result<(), TransactionError> {
        let session = match (self.state, self.session.as_mut()) {
            (TransactionState::Started, Some(session)) => session,
            _ => {
                return Err(TransactionError::IllegalState {
                    operation: "commit",
                    state: self.state,
                })
            }
        };

        session.commit()?;
        self.state = TransactionState::Committed;

        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close() {
                warn!(shard = self.shard, error = %e, "Failed to close committed session");
            }
        }
        debug!(shard = self.shard, "Unit of work committed");
        Ok(())
    }

    /// Roll back and release the unit of work, best effort
    ///
    /// Never fails. Rollback and close failures are logged and kept in
    /// [`rollback_failure`](Self::rollback_failure).
    pub fn on_error(&mut self) {
        if self.state.is_terminal() {
            warn!(
                shard = self.shard,
                state = %self.state,
                "Rollback requested on finished transaction"
            );
            return;
        }

        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.rollback() {
                warn!(shard = self.shard, error = %e, "Rollback failed");
                self.rollback_failure = Some(e);
            }
            if let Err(e) = session.close() {
                warn!(shard = self.shard, error = %e, "Failed to close rolled back session");
                self.rollback_failure.get_or_insert(e);
            }
        }

        self.state = TransactionState::RolledBack;
        debug!(shard = self.shard, "Unit of work rolled back");
    }
}

impl<P: SessionProvider> Drop for TransactionHandler<'_, P> {
    fn drop(&mut self) {
        if !self.state.is_terminal() && self.session.is_some() {
            warn!(
                shard = self.shard,
                state = %self.state,
                "Transaction handler dropped with open unit of work"
            );
            self.on_error();
        }
    }
}
