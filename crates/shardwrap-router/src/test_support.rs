//! Recording session provider for unit tests

use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::SessionError;
use crate::session::{SessionProvider, UnitOfWork};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Open { read_only: bool },
    Begin,
    Commit,
    Rollback,
    Close,
}

#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    open: bool,
    begin: bool,
    commit: bool,
    rollback: bool,
}

/// Records every lifecycle call; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingProvider {
    events: Arc<Mutex<Vec<Lifecycle>>>,
    faults: Faults,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_open(mut self) -> Self {
        self.faults.open = true;
        self
    }

    pub fn fail_begin(mut self) -> Self {
        self.faults.begin = true;
        self
    }

    pub fn fail_commit(mut self) -> Self {
        self.faults.commit = true;
        self
    }

    pub fn fail_rollback(mut self) -> Self {
        self.faults.rollback = true;
        self
    }

    pub fn events(&self) -> Vec<Lifecycle> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: Lifecycle) -> usize {
        self.events.lock().iter().filter(|e| **e == event).count()
    }
}

pub struct RecordingSession {
    events: Arc<Mutex<Vec<Lifecycle>>>,
    faults: Faults,
}

impl SessionProvider for RecordingProvider {
    type Session = RecordingSession;

    fn open(&self, read_only: bool) -> Result<RecordingSession, SessionError> {
        if self.faults.open {
            return Err(SessionError::Open("store offline".to_string()));
        }
        self.events.lock().push(Lifecycle::Open { read_only });
        Ok(RecordingSession {
            events: self.events.clone(),
            faults: self.faults,
        })
    }
}

impl UnitOfWork for RecordingSession {
    fn begin(&mut self) -> Result<(), SessionError> {
        if self.faults.begin {
            return Err(SessionError::Begin("lock timeout".to_string()));
        }
        self.events.lock().push(Lifecycle::Begin);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SessionError> {
        if self.faults.commit {
            return Err(SessionError::Commit("constraint violated".to_string()));
        }
        self.events.lock().push(Lifecycle::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SessionError> {
        self.events.lock().push(Lifecycle::Rollback);
        if self.faults.rollback {
            return Err(SessionError::Rollback("connection reset".to_string()));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SessionError> {
        self.events.lock().push(Lifecycle::Close);
        Ok(())
    }
}
