//! Aggregate document assembly

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;

use super::Corpus;
use super::hierarchy::complexity_score;
use super::suggestions::{migration_recommendations, performance_suggestions, validation_queries};
use crate::config::ExtractorConfig;
use crate::models::context::ContextMappingEntry;
use crate::models::corpus::{
    AggregateDocument, ExtractionMetadata, JobRole, JobSummary, TableAnalysis, TableUsage,
};
use crate::models::sql::{SqlExtraction, SqlQueryEntry};
use crate::models::transform::{TransformExpression, TransformationEntry};

/// Target-platform cast template for a declared column type, with a
/// `{column}` placeholder. Types without a numeric or temporal target pass the
/// column through.
pub fn safe_cast(data_type: &str) -> &'static str {
    match data_type {
        "id_Integer" | "id_Long" | "id_Short" | "id_Byte" | "Integer" | "Long" => {
            "SAFE_CAST({column} AS INT64)"
        }
        "id_BigDecimal" => "SAFE_CAST({column} AS NUMERIC)",
        "id_Double" | "id_Float" | "Double" => "SAFE_CAST({column} AS FLOAT64)",
        "id_Date" | "id_Timestamp" => "SAFE.PARSE_TIMESTAMP('%Y-%m-%d %H:%M:%S', {column})",
        "Date" => "SAFE.PARSE_DATE('%Y-%m-%d', {column})",
        _ => "{column}",
    }
}

/// Per-table usage over a list of SQL extractions.
pub fn table_operations(sql: &[SqlExtraction]) -> BTreeMap<String, TableUsage> {
    #[derive(Default)]
    struct Usage<'a> {
        operations: BTreeSet<String>,
        components: BTreeSet<&'a str>,
        jobs: BTreeSet<&'a str>,
    }

    let mut usage: BTreeMap<&str, Usage<'_>> = BTreeMap::new();
    for extraction in sql {
        for table in &extraction.tables {
            let entry = usage.entry(table.as_str()).or_default();
            entry.operations.insert(extraction.operation.to_string());
            entry.components.insert(extraction.component_name.as_str());
            entry.jobs.insert(extraction.job_name.as_str());
        }
    }

    usage
        .into_iter()
        .map(|(table, u)| {
            (
                table.to_string(),
                TableUsage {
                    operations: u.operations.into_iter().collect(),
                    used_in_jobs: u.jobs.into_iter().map(str::to_string).collect(),
                    component_count: u.components.len(),
                },
            )
        })
        .collect()
}

fn transformation_entry(expression: &TransformExpression) -> TransformationEntry {
    TransformationEntry {
        job: expression.job_name.clone(),
        component: expression.component_name.clone(),
        mapping: expression.mapping(),
        data_type: expression.data_type.clone(),
        safe_cast: safe_cast(&expression.data_type).to_string(),
    }
}

/// Assemble the aggregate document of a merged corpus.
pub fn assemble(corpus: &Corpus, config: &ExtractorConfig) -> AggregateDocument {
    let mut doc = AggregateDocument {
        extraction_metadata: metadata(corpus, config),
        job_hierarchy: corpus.roles.clone(),
        jobs_summary: BTreeMap::new(),
        sql_queries: corpus.sql.iter().map(SqlQueryEntry::from).collect(),
        transformations: corpus.transforms.iter().map(transformation_entry).collect(),
        tables: TableAnalysis {
            all_tables: corpus.tables.iter().cloned().collect(),
            table_operations: table_operations(&corpus.sql),
        },
        context_mappings: corpus
            .context_variables
            .iter()
            .map(|(name, var)| (name.clone(), ContextMappingEntry::from(var)))
            .collect(),
        transaction_patterns: BTreeMap::new(),
        error_patterns: BTreeMap::new(),
        data_quality_rules: BTreeMap::new(),
        performance_hints: BTreeMap::new(),
        connection_metadata: BTreeMap::new(),
        performance_suggestions: performance_suggestions(corpus, config),
        dependency_graphs: BTreeMap::new(),
        validation_queries: validation_queries(corpus, config),
        migration_recommendations: migration_recommendations(corpus, config),
    };

    for job in &corpus.jobs {
        let name = job.name.clone();

        if let Some(transactions) = &job.transactions {
            doc.transaction_patterns
                .insert(name.clone(), transactions.clone());
        }
        if !job.error_patterns.is_empty() {
            doc.error_patterns
                .insert(name.clone(), job.error_patterns.clone());
        }
        if !job.data_quality_rules.is_empty() {
            doc.data_quality_rules
                .insert(name.clone(), job.data_quality_rules.clone());
        }
        if let Some(hints) = &job.performance_hints {
            doc.performance_hints.insert(name.clone(), hints.clone());
        }
        if !job.connection_metadata.is_empty() {
            doc.connection_metadata
                .insert(name.clone(), job.connection_metadata.clone());
        }
        if !job.graph.is_empty() {
            doc.dependency_graphs.insert(name.clone(), job.graph.clone());
        }

        let summary = JobSummary {
            role: corpus.roles.get(&name).copied().unwrap_or(JobRole::Processor),
            components: job.component_count,
            sql_queries: job.sql.len(),
            transformations: job.transforms.len(),
            tables: job.tables.iter().cloned().collect(),
            dependency_graph: job.graph.clone(),
            transform_structures: job.transform_structures.clone(),
            complexity_score: complexity_score(job),
            has_transactions: doc.transaction_patterns.contains_key(&name),
            has_error_handling: doc.error_patterns.contains_key(&name),
            has_data_quality: doc.data_quality_rules.contains_key(&name),
        };
        doc.jobs_summary.insert(name, summary);
    }

    doc
}

fn metadata(corpus: &Corpus, config: &ExtractorConfig) -> ExtractionMetadata {
    let output = &config.output;
    ExtractionMetadata {
        generated_at: output.stamp_generated_at.then(|| Utc::now().to_rfc3339()),
        total_jobs: corpus.jobs.len(),
        total_sql_queries: corpus.sql.len(),
        total_transformations: corpus.transforms.len(),
        unique_tables: corpus.tables.len(),
        context_variables: corpus.context_variables.len(),
        transaction_groups: corpus
            .jobs
            .iter()
            .filter_map(|job| job.transactions.as_ref())
            .map(|t| t.transaction_groups.len())
            .sum(),
        error_patterns: corpus.jobs.iter().map(|job| job.error_patterns.len()).sum(),
        data_quality_rules: corpus
            .jobs
            .iter()
            .flat_map(|job| job.data_quality_rules.values())
            .map(Vec::len)
            .sum(),
        version: output.version.clone(),
        source_platform: output.source_platform.clone(),
        target_platform: output.target_platform.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sql::SqlOperation;

    fn sql(job: &str, component: &str, operation: SqlOperation, tables: &[&str]) -> SqlExtraction {
        SqlExtraction {
            job_name: job.to_string(),
            component_name: component.to_string(),
            component_type: "tDBRow".to_string(),
            operation,
            raw_sql: String::new(),
            cleaned_sql: String::new(),
            tables: tables.iter().map(|t| t.to_string()).collect(),
            context_variables: Vec::new(),
        }
    }

    #[test]
    fn test_safe_cast() {
        assert_eq!(safe_cast("id_Long"), "SAFE_CAST({column} AS INT64)");
        assert_eq!(safe_cast("id_BigDecimal"), "SAFE_CAST({column} AS NUMERIC)");
        assert_eq!(safe_cast("Date"), "SAFE.PARSE_DATE('%Y-%m-%d', {column})");
        assert_eq!(
            safe_cast("id_Timestamp"),
            "SAFE.PARSE_TIMESTAMP('%Y-%m-%d %H:%M:%S', {column})"
        );
        assert_eq!(safe_cast("id_String"), "{column}");
        assert_eq!(safe_cast("id_Unheard"), "{column}");
    }

    #[test]
    fn test_table_operations() {
        let usage = table_operations(&[
            sql("B", "out", SqlOperation::Insert, &["orders"]),
            sql("A", "in", SqlOperation::Select, &["orders", "customers"]),
            sql("A", "in", SqlOperation::Select, &["orders"]),
        ]);

        let orders = &usage["orders"];
        assert_eq!(orders.operations, vec!["INSERT", "SELECT"]);
        assert_eq!(orders.used_in_jobs, vec!["A", "B"]);
        assert_eq!(orders.component_count, 2);
        assert_eq!(usage["customers"].component_count, 1);
    }

    #[test]
    fn test_metadata_is_unstamped_by_default() {
        let doc = assemble(&Corpus::default(), &ExtractorConfig::default());
        assert_eq!(doc.extraction_metadata.generated_at, None);
        assert_eq!(doc.extraction_metadata.source_platform, "Talend");
        assert!(doc.jobs_summary.is_empty());

        let mut config = ExtractorConfig::default();
        config.output.stamp_generated_at = true;
        let doc = assemble(&Corpus::default(), &config);
        assert!(doc.extraction_metadata.generated_at.is_some());
    }
}
