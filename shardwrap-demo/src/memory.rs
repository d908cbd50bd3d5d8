//! In-memory session provider
//!
//! Each provider is one shard's store. A unit of work is bound to the thread
//! that began it: writes are staged per thread and only reach the committed
//! map on commit. Reads see the caller's staged writes first.

use parking_lot::{Mutex, RwLock};
use shardwrap_router::{SessionError, SessionProvider, UnitOfWork};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tracing::debug;
use uuid::Uuid;

/// One shard's in-memory store
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    committed: RwLock<BTreeMap<String, i64>>,
    active: Mutex<HashMap<ThreadId, Staged>>,
}

#[derive(Debug)]
struct Staged {
    session: Uuid,
    read_only: bool,
    writes: BTreeMap<String, i64>,
}

impl MemoryProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                committed: RwLock::new(BTreeMap::new()),
                active: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Read a value, seeing this thread's staged writes if a unit of work is active
    pub fn read(&self, key: &str) -> Option<i64> {
        let staged = self
            .inner
            .active
            .lock()
            .get(&thread::current().id())
            .and_then(|staged| staged.writes.get(key).copied());
        staged.or_else(|| self.inner.committed.read().get(key).copied())
    }

    /// Stage a write in this thread's unit of work
    pub fn write(&self, key: &str, value: i64) -> Result<(), SessionError> {
        let mut active = self.inner.active.lock();
        let staged = active
            .get_mut(&thread::current().id())
            .ok_or(SessionError::NoActiveUnit)?;
        if staged.read_only {
            return Err(SessionError::ReadOnly);
        }
        staged.writes.insert(key.to_string(), value);
        Ok(())
    }

    /// Committed contents
    pub fn snapshot(&self) -> BTreeMap<String, i64> {
        self.inner.committed.read().clone()
    }

    /// Whether the calling thread has a unit of work open
    pub fn has_active_unit(&self) -> bool {
        self.inner.active.lock().contains_key(&thread::current().id())
    }
}

impl SessionProvider for MemoryProvider {
    type Session = MemorySession;

    fn open(&self, read_only: bool) -> Result<MemorySession, SessionError> {
        Ok(MemorySession {
            inner: self.inner.clone(),
            id: Uuid::new_v4(),
            thread: thread::current().id(),
            read_only,
        })
    }
}

/// A unit of work against a [`MemoryProvider`]
#[derive(Debug)]
pub struct MemorySession {
    inner: Arc<Inner>,
    id: Uuid,
    thread: ThreadId,
    read_only: bool,
}

impl MemorySession {
    fn take_staged(&self) -> Option<Staged> {
        let mut active = self.inner.active.lock();
        let owned = active
            .get(&self.thread)
            .map_or(false, |staged| staged.session == self.id);
        if owned {
            active.remove(&self.thread)
        } else {
            None
        }
    }
}

impl UnitOfWork for MemorySession {
    fn begin(&mut self) -> Result<(), SessionError> {
        let mut active = self.inner.active.lock();
        if active.contains_key(&self.thread) {
            return Err(SessionError::Begin(format!(
                "thread already has a unit of work open on {}",
                self.inner.name
            )));
        }
        active.insert(
            self.thread,
            Staged {
                session: self.id,
                read_only: self.read_only,
                writes: BTreeMap::new(),
            },
        );
        debug!(store = %self.inner.name, session = %self.id, read_only = self.read_only, "Begin");
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SessionError> {
        let staged = self
            .take_staged()
            .ok_or_else(|| SessionError::Commit(format!("session {} is not active", self.id)))?;

        let writes = staged.writes.len();
        self.inner.committed.write().extend(staged.writes);
        debug!(store = %self.inner.name, session = %self.id, writes, "Commit");
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SessionError> {
        let discarded = self.take_staged().map(|s| s.writes.len()).unwrap_or(0);
        debug!(store = %self.inner.name, session = %self.id, discarded, "Rollback");
        Ok(())
    }

    fn close(&mut self) -> Result<(), SessionError> {
        if self.take_staged().is_some() {
            debug!(store = %self.inner.name, session = %self.id, "Closed with staged writes");
        }
        Ok(())
    }
}
