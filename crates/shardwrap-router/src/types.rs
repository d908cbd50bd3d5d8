//! Common types for the router module

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Marks an operation as transactional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionalDeclaration {
    /// Open the unit of work read-only
    pub read_only: bool,
}

impl TransactionalDeclaration {
    pub const fn read_write() -> Self {
        Self { read_only: false }
    }

    pub const fn read_only() -> Self {
        Self { read_only: true }
    }
}

/// Operation name → transactional declaration, built once per DAO type
///
/// Operations missing from the table are not transactional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationTable {
    entries: HashMap<&'static str, TransactionalDeclaration>,
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `operation` transactional. A later declaration replaces an earlier one.
    pub fn declare(&mut self, operation: &'static str, declaration: TransactionalDeclaration) {
        self.entries.insert(operation, declaration);
    }

    /// Builder form of [`declare`](Self::declare)
    pub fn with(mut self, operation: &'static str, declaration: TransactionalDeclaration) -> Self {
        self.declare(operation, declaration);
        self
    }

    pub fn get(&self, operation: &str) -> Option<TransactionalDeclaration> {
        self.entries.get(operation).copied()
    }

    pub fn is_transactional(&self, operation: &str) -> bool {
        self.entries.contains_key(operation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lifecycle state of a single transaction handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    NotStarted,
    Started,
    Committed,
    RolledBack,
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionState::Committed | TransactionState::RolledBack)
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionState::NotStarted => write!(f, "not started"),
            TransactionState::Started => write!(f, "started"),
            TransactionState::Committed => write!(f, "committed"),
            TransactionState::RolledBack => write!(f, "rolled back"),
        }
    }
}
