//! Extraction functionality
//!
//! Per-job extractors over a parsed [`JobDocument`](crate::models::JobDocument):
//! - `classifier` - component routing
//! - `sql` - SQL cleaning, table and context-variable extraction, operation detection
//! - `transform` - tMap structures and field expressions
//! - `transaction` - transaction boundary detection
//! - `quality` - error-handling patterns and data-quality rules
//! - `connection` - connection metadata and performance hints
//! - `context` - context variable classification
//! - `graph` - component dependency graph
//! - `job` - the per-job driver tying them together

pub mod classifier;
pub mod connection;
pub mod context;
pub mod graph;
pub mod job;
pub mod quality;
pub mod sql;
pub mod transaction;
pub mod transform;

pub use classifier::{ComponentRoute, DatabaseRole, ProcessingRoute};
pub use context::ContextClassifier;
pub use graph::{GraphBuilder, build_graph};
pub use job::{JobExtraction, JobExtractor};
pub use sql::{clean_sql, detect_operation, extract_context_vars, extract_tables};
pub use transaction::detect_transactions;

use crate::import::ImportError;

/// Error during corpus extraction
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Corpus root not found: {0}")]
    MissingRoot(String),
    #[error(transparent)]
    Import(#[from] ImportError),
}
