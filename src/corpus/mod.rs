//! Corpus-level extraction
//!
//! Loads every job of a source, extracts each one independently, then merges
//! the results in discovery order:
//! - `dedup` - corpus-wide SQL deduplication
//! - `hierarchy` - job roles and complexity scores
//! - `suggestions` - heuristics over the merged corpus
//! - `assembly` - the final [`AggregateDocument`]

pub mod assembly;
pub mod dedup;
pub mod hierarchy;
pub mod suggestions;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::info;

use crate::config::ExtractorConfig;
use crate::export::{ContextMappingDocument, TransformDocument, render_sql_script, render_summary};
use crate::extract::ExtractError;
use crate::extract::context::ContextClassifier;
use crate::extract::job::{JobExtraction, JobExtractor};
use crate::import::loader::{DirectorySource, JobLoader, JobSource, LoadFailure};
use crate::import::stats::{CorpusStats, Tokenizer};
use crate::models::context::ContextVariable;
use crate::models::corpus::{AggregateDocument, JobRole};
use crate::models::job::JobDocument;
use crate::models::sql::SqlExtraction;
use crate::models::transform::TransformExpression;

pub use assembly::{assemble, safe_cast, table_operations};
pub use dedup::{compute_hash, deduplicate};
pub use hierarchy::{complexity_score, infer_role};

/// Merged per-job extractions
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Job extractions in discovery order
    pub jobs: Vec<JobExtraction>,
    pub roles: BTreeMap<String, JobRole>,
    /// Deduplicated SQL, first occurrence retained
    pub sql: Vec<SqlExtraction>,
    /// Every transform expression, never deduplicated
    pub transforms: Vec<TransformExpression>,
    pub tables: BTreeSet<String>,
    /// Classified context variables by name
    pub context_variables: BTreeMap<String, ContextVariable>,
}

impl Corpus {
    /// Merge job extractions given in discovery order.
    ///
    /// Context variables are classified in merge order, so the first job
    /// declaring a name fixes its category; declared type and default value
    /// come from the last declaration.
    pub fn merge(jobs: Vec<JobExtraction>) -> Self {
        let mut classifier = ContextClassifier::new();
        let mut corpus = Corpus::default();

        for job in &jobs {
            corpus
                .roles
                .insert(job.name.clone(), infer_role(&job.name, job.has_sub_job));
            corpus.tables.extend(job.tables.iter().cloned());
            corpus.transforms.extend(job.transforms.iter().cloned());
            for param in &job.context_parameters {
                corpus
                    .context_variables
                    .insert(param.name.clone(), classifier.variable(param));
            }
        }

        let total_sql: usize = jobs.iter().map(|job| job.sql.len()).sum();
        corpus.sql = deduplicate(jobs.iter().flat_map(|job| job.sql.iter().cloned()));
        info!("Deduplicated SQL: {} -> {}", total_sql, corpus.sql.len());

        corpus.jobs = jobs;
        corpus
    }
}

/// Everything produced from one corpus
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub corpus: Corpus,
    pub document: AggregateDocument,
    /// Jobs that could not be loaded
    pub failures: Vec<LoadFailure>,
}

impl ExtractionOutput {
    /// SQL script with provenance comments
    pub fn sql_script(&self) -> String {
        render_sql_script(&self.corpus)
    }

    /// Transform expressions grouped by job
    pub fn transform_document(&self) -> TransformDocument {
        TransformDocument::from_corpus(&self.corpus)
    }

    pub fn context_document(&self) -> ContextMappingDocument {
        ContextMappingDocument::from_document(&self.document)
    }

    /// Plain-text summary report
    pub fn summary(&self) -> String {
        render_summary(&self.document)
    }

    /// Size and token statistics of the text outputs
    pub fn text_stats<T: Tokenizer + ?Sized>(&self, tokenizer: &T) -> CorpusStats {
        CorpusStats::from_texts(
            "Destination",
            [
                ("sql_queries.sql", self.sql_script()),
                ("extraction_summary.txt", self.summary()),
            ],
            tokenizer,
        )
    }
}

/// Runs extraction over a whole corpus
#[derive(Debug, Clone, Default)]
pub struct CorpusExtractor {
    config: ExtractorConfig,
    extractor: JobExtractor,
}

impl CorpusExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            extractor: JobExtractor::new(),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract every job found recursively under a directory, matching the
    /// configured extensions.
    pub fn extract_directory(&self, root: &Path) -> Result<ExtractionOutput, ExtractError> {
        if !root.is_dir() {
            return Err(ExtractError::MissingRoot(root.display().to_string()));
        }
        let source = DirectorySource::with_extensions(root, &self.config.discovery.extensions);
        self.extract_source(&source)
    }

    /// Extract every job of a source. Jobs that fail to load are skipped and
    /// reported in [`ExtractionOutput::failures`].
    pub fn extract_source<S: JobSource>(&self, source: S) -> Result<ExtractionOutput, ExtractError> {
        let loaded = JobLoader::new(source).load()?;
        let mut output = self.extract_jobs(&loaded.jobs);
        output.failures = loaded.failures;
        Ok(output)
    }

    /// Extract already loaded jobs, given in discovery order.
    pub fn extract_jobs(&self, jobs: &[JobDocument]) -> ExtractionOutput {
        info!("Extracting {} jobs", jobs.len());

        #[cfg(feature = "parallel")]
        let extractions: Vec<JobExtraction> = jobs
            .par_iter()
            .map(|job| self.extractor.extract(job))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let extractions: Vec<JobExtraction> = jobs
            .iter()
            .map(|job| self.extractor.extract(job))
            .collect();

        let corpus = Corpus::merge(extractions);
        let document = assemble(&corpus, &self.config);
        info!(
            "Extracted {} SQL statements, {} transforms, {} tables",
            corpus.sql.len(),
            corpus.transforms.len(),
            corpus.tables.len()
        );

        ExtractionOutput {
            corpus,
            document,
            failures: Vec::new(),
        }
    }
}
