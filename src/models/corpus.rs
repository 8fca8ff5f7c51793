//! Aggregate document model
//!
//! The single corpus-wide document produced after every job has been
//! extracted. All maps are ordered so that serializing the same corpus twice
//! produces identical bytes.

use super::context::ContextMappingEntry;
use super::graph::DependencyGraph;
use super::performance::{ConnectionMetadata, PerformanceHints};
use super::quality::{DataQualityRule, ErrorPattern};
use super::sql::SqlQueryEntry;
use super::transaction::TransactionSummary;
use super::transform::{TransformStructure, TransformationEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Position of a job in the orchestration hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobRole {
    Orchestrator,
    OrchestratorMid,
    OrchestratorTop,
    Processor,
}

impl JobRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobRole::Orchestrator => "orchestrator",
            JobRole::OrchestratorMid => "orchestrator_mid",
            JobRole::OrchestratorTop => "orchestrator_top",
            JobRole::Processor => "processor",
        }
    }
}

impl fmt::Display for JobRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Corpus counts and provenance labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// RFC 3339 timestamp, only present when stamping is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub total_jobs: usize,
    pub total_sql_queries: usize,
    pub total_transformations: usize,
    pub unique_tables: usize,
    pub context_variables: usize,
    pub transaction_groups: usize,
    pub error_patterns: usize,
    pub data_quality_rules: usize,
    pub version: String,
    pub source_platform: String,
    pub target_platform: String,
}

/// Per-job summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub role: JobRole,
    pub components: usize,
    pub sql_queries: usize,
    pub transformations: usize,
    pub tables: Vec<String>,
    pub dependency_graph: DependencyGraph,
    /// Mapper structures keyed by component name
    pub transform_structures: BTreeMap<String, TransformStructure>,
    pub complexity_score: usize,
    pub has_transactions: bool,
    pub has_error_handling: bool,
    pub has_data_quality: bool,
}

/// How a table is used across the deduplicated SQL list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableUsage {
    /// Operation labels, sorted
    pub operations: Vec<String>,
    pub used_in_jobs: Vec<String>,
    pub component_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableAnalysis {
    pub all_tables: Vec<String>,
    pub table_operations: BTreeMap<String, TableUsage>,
}

/// Sample query for post-migration validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationQuery {
    RowCount {
        table: String,
        query: String,
        description: String,
    },
    SchemaValidation {
        component: String,
        query: String,
        description: String,
    },
    NullCheck {
        column: String,
        query: String,
        description: String,
    },
}

/// Recommendations keyed by migration phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationRecommendations {
    pub pre_migration: Vec<String>,
    pub during_migration: Vec<String>,
    pub post_migration: Vec<String>,
}

/// The corpus-wide extraction result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateDocument {
    pub extraction_metadata: ExtractionMetadata,
    pub job_hierarchy: BTreeMap<String, JobRole>,
    pub jobs_summary: BTreeMap<String, JobSummary>,
    pub sql_queries: Vec<SqlQueryEntry>,
    pub transformations: Vec<TransformationEntry>,
    pub tables: TableAnalysis,
    pub context_mappings: BTreeMap<String, ContextMappingEntry>,
    pub transaction_patterns: BTreeMap<String, TransactionSummary>,
    pub error_patterns: BTreeMap<String, Vec<ErrorPattern>>,
    /// Rules keyed by job, then by component
    pub data_quality_rules: BTreeMap<String, BTreeMap<String, Vec<DataQualityRule>>>,
    pub performance_hints: BTreeMap<String, PerformanceHints>,
    /// Connection settings keyed by job, then by component
    pub connection_metadata: BTreeMap<String, BTreeMap<String, ConnectionMetadata>>,
    pub performance_suggestions: Vec<String>,
    pub dependency_graphs: BTreeMap<String, DependencyGraph>,
    pub validation_queries: Vec<ValidationQuery>,
    pub migration_recommendations: MigrationRecommendations,
}
