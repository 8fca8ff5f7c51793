//! Transaction boundary model

use super::sql::SqlOperation;
use serde::{Deserialize, Serialize};

/// How a transaction group ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalKind {
    Commit,
    Rollback,
    Close,
    /// Still open when the job ended
    ImplicitCommit,
}

impl TerminalKind {
    /// Terminal kind of a commit/rollback/close component type.
    pub fn from_component_type(component_type: &str) -> Self {
        if component_type.contains("Commit") {
            TerminalKind::Commit
        } else if component_type.contains("Rollback") {
            TerminalKind::Rollback
        } else {
            TerminalKind::Close
        }
    }
}

/// Operation component inside a transaction group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionOperation {
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub operation: SqlOperation,
    pub tables: Vec<String>,
}

/// Span of components between a connection open and its commit, rollback or close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionGroup {
    pub connection_component: String,
    pub auto_commit: bool,
    pub use_batch: bool,
    pub batch_size: u64,
    pub components: Vec<TransactionOperation>,
    /// Tables written by data-modifying operations, sorted
    pub tables_modified: Vec<String>,
    pub requires_atomicity: bool,
    pub end_component: Option<String>,
    pub transaction_type: TerminalKind,
}

/// Transaction boundaries detected in one job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub transaction_groups: Vec<TransactionGroup>,
    pub atomic_operations_required: usize,
    pub tables_requiring_atomicity: Vec<String>,
}
