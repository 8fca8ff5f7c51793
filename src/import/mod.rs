//! Import functionality
//!
//! Reads job definition documents from storage and turns them into typed
//! [`JobDocument`](crate::models::JobDocument)s:
//! - `xml` - element tree built with quick-xml
//! - `job` - single-pass conversion of the tree into the job model
//! - `loader` - discovery over a [`JobSource`](loader::JobSource) with per-job failure isolation
//! - `stats` - corpus size and token statistics

pub mod job;
pub mod loader;
pub mod stats;
pub mod xml;

pub use job::JobImporter;
pub use loader::{DirectorySource, InMemorySource, JobLoader, JobSource, LoadFailure, LoadResult};
pub use stats::{CorpusStats, FileStats, Tokenizer, WhitespaceTokenizer};
pub use xml::XmlElement;

/// Error during import
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Structure error: {0}")]
    StructureError(String),
    #[error("IO error: {0}")]
    IoError(String),
}
