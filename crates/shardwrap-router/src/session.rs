//! Persistence session capabilities
//!
//! A [`SessionProvider`] belongs to exactly one shard and hands out one
//! [`UnitOfWork`] per intercepted call. Providers are expected to scope the
//! unit of work to the calling thread so that the DAO running inside the
//! call can find it.

use crate::error::SessionError;

/// Opens units of work against one shard's backing store
pub trait SessionProvider: Send + Sync {
    /// Unit of work handed out per call
    type Session: UnitOfWork;

    /// Open a session. `read_only` units must refuse writes.
    fn open(&self, read_only: bool) -> Result<Self::Session, SessionError>;
}

/// Begin/commit/rollback-scoped interaction with a session
pub trait UnitOfWork: Send {
    fn begin(&mut self) -> Result<(), SessionError>;

    fn commit(&mut self) -> Result<(), SessionError>;

    fn rollback(&mut self) -> Result<(), SessionError>;

    /// Release the session. Called once after commit or rollback.
    fn close(&mut self) -> Result<(), SessionError> {
        Ok(())
    }
}
