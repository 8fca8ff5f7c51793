//! Per-job extraction
//!
//! [`JobExtractor`] routes every component of a job to the extractors that
//! handle it and collects their results in a [`JobExtraction`]. Extraction of
//! one job never looks at another, so jobs can be processed in any order and
//! merged afterwards.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::classifier::{ComponentRoute, ProcessingRoute};
use super::connection::{extract_connection_metadata, extract_performance_hints};
use super::graph::GraphBuilder;
use super::quality::{extract_data_quality_rules, extract_error_pattern};
use super::sql::extract_component_sql;
use super::transaction::detect_transactions;
use super::transform::{extract_expressions, extract_structure};
use crate::models::graph::DependencyGraph;
use crate::models::job::{ComponentNode, ContextParameter, JobDocument};
use crate::models::performance::{ConnectionMetadata, PerformanceHints};
use crate::models::quality::{DataQualityRule, ErrorPattern};
use crate::models::sql::SqlExtraction;
use crate::models::transaction::TransactionSummary;
use crate::models::transform::{TransformExpression, TransformStructure};

/// Everything extracted from a single job.
#[derive(Debug, Clone, Default)]
pub struct JobExtraction {
    pub name: String,
    /// Counted (non-error, non-lifecycle, non-excluded) components
    pub component_count: usize,
    /// Whether the job invokes a sub-job
    pub has_sub_job: bool,
    /// SQL statements in document order, before corpus deduplication
    pub sql: Vec<SqlExtraction>,
    /// Tables referenced by the job's SQL
    pub tables: BTreeSet<String>,
    pub transforms: Vec<TransformExpression>,
    pub transform_structures: BTreeMap<String, TransformStructure>,
    pub transactions: Option<TransactionSummary>,
    pub error_patterns: Vec<ErrorPattern>,
    /// Data-quality rules by component, only components with rules
    pub data_quality_rules: BTreeMap<String, Vec<DataQualityRule>>,
    /// Connection lifecycle settings by component
    pub connection_metadata: BTreeMap<String, ConnectionMetadata>,
    pub performance_hints: Option<PerformanceHints>,
    pub graph: DependencyGraph,
    /// Named context parameters of every context definition, in order
    pub context_parameters: Vec<ContextParameter>,
}

impl JobExtraction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether any transform of the job declares a reject flow
    pub fn has_reject_flows(&self) -> bool {
        self.transform_structures
            .values()
            .any(|s| !s.reject_flows.is_empty())
    }

    fn add_sql(&mut self, extractions: Vec<SqlExtraction>) {
        for extraction in extractions {
            self.tables.extend(extraction.tables.iter().cloned());
            self.sql.push(extraction);
        }
    }
}

/// Routes the components of a job to the extractors.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobExtractor;

impl JobExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract a job.
    ///
    /// # Arguments
    ///
    /// * `job` - Parsed job document
    ///
    /// # Returns
    ///
    /// The job's [`JobExtraction`]. Extraction itself cannot fail: missing or
    /// malformed values fall back to defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use etl_extraction_sdk::extract::JobExtractor;
    /// use etl_extraction_sdk::import::JobImporter;
    ///
    /// let xml = r#"<ProcessType>
    ///   <node componentName="tDBInput" componentVersion="0.1">
    ///     <elementParameter name="UNIQUE_NAME" value="tDBInput_1"/>
    ///     <elementParameter name="QUERY" value="&quot;SELECT id FROM sales.orders&quot;"/>
    ///   </node>
    /// </ProcessType>"#;
    /// let job = JobImporter::new().import("LoadOrders", xml).unwrap();
    /// let extraction = JobExtractor::new().extract(&job);
    /// assert_eq!(extraction.component_count, 1);
    /// assert!(extraction.tables.contains("orders"));
    /// ```
    pub fn extract(&self, job: &JobDocument) -> JobExtraction {
        let mut extraction = JobExtraction::new(&job.name);
        let mut graph = GraphBuilder::new();

        for node in &job.nodes {
            graph.register(node);
            self.route(job, node, &mut extraction);
        }

        extraction.graph = graph.finish(job);
        extraction.transactions = detect_transactions(job);
        extraction.performance_hints = extract_performance_hints(job);
        extraction.context_parameters = job
            .contexts
            .iter()
            .flat_map(|context| context.parameters.iter())
            .filter(|param| !param.name.is_empty())
            .cloned()
            .collect();

        debug!(
            "Job {}: {} components, {} SQL statements, {} transforms",
            job.name,
            extraction.component_count,
            extraction.sql.len(),
            extraction.transforms.len()
        );
        extraction
    }

    fn route(&self, job: &JobDocument, node: &ComponentNode, extraction: &mut JobExtraction) {
        match ComponentRoute::classify(&node.component_type) {
            ComponentRoute::ErrorHandling => {
                if let Some(pattern) = extract_error_pattern(job, node) {
                    extraction.error_patterns.push(pattern);
                }
            }
            ComponentRoute::ConnectionLifecycle => {
                extraction
                    .connection_metadata
                    .insert(node.unique_name.clone(), extract_connection_metadata(node));
            }
            ComponentRoute::Excluded => {}
            ComponentRoute::Processing(route) => self.process(job, node, route, extraction),
        }
    }

    fn process(
        &self,
        job: &JobDocument,
        node: &ComponentNode,
        route: ProcessingRoute,
        extraction: &mut JobExtraction,
    ) {
        extraction.component_count += 1;
        if route.sub_job {
            extraction.has_sub_job = true;
        }

        extraction.add_sql(extract_component_sql(&job.name, node));

        if route.transform {
            extraction
                .transform_structures
                .insert(node.unique_name.clone(), extract_structure(node));
            extraction
                .transforms
                .extend(extract_expressions(&job.name, node));
        }

        if route.data_quality {
            let rules = extract_data_quality_rules(node);
            if !rules.is_empty() {
                extraction
                    .data_quality_rules
                    .insert(node.unique_name.clone(), rules);
            }
        }
    }
}
