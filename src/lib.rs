//! ETL Extraction SDK - Extraction and normalization engine for ETL job definitions
//!
//! Provides unified interfaces for:
//! - Job discovery and loading (via job sources)
//! - Per-job extraction: SQL, field mappings, transactions, error handling,
//!   data-quality rules, connection settings, dependency graphs
//! - Corpus merge: deduplication, job hierarchy, complexity scoring
//! - Aggregate document assembly and auxiliary exports
//! - Configuration file support

pub mod config;
pub mod corpus;
pub mod export;
pub mod extract;
pub mod import;
pub mod models;

// Re-export commonly used types
pub use config::{ConfigError, ExtractorConfig};
pub use corpus::{Corpus, CorpusExtractor, ExtractionOutput};
pub use export::{ContextMappingDocument, TransformDocument, render_sql_script, render_summary};
pub use extract::{ContextClassifier, ExtractError, JobExtraction, JobExtractor};
pub use import::{
    CorpusStats, DirectorySource, ImportError, InMemorySource, JobImporter, JobLoader, JobSource,
    Tokenizer, WhitespaceTokenizer,
};

// Re-export models
pub use models::{AggregateDocument, JobDocument, JobRole, SqlExtraction, SqlOperation};
