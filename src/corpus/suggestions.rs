//! Performance suggestions, validation queries and migration recommendations
//!
//! Heuristics over the merged corpus. Every threshold and limit comes from
//! [`ExtractorConfig`].

use std::collections::{BTreeMap, BTreeSet};

use super::Corpus;
use crate::config::ExtractorConfig;
use crate::models::corpus::{MigrationRecommendations, ValidationQuery};
use crate::models::sql::SqlOperation;

/// Number of frequently accessed tables named in the staging suggestion
const NAMED_TABLES: usize = 3;

/// Optimization suggestions, in a fixed order.
pub fn performance_suggestions(corpus: &Corpus, config: &ExtractorConfig) -> Vec<String> {
    let thresholds = &config.thresholds;
    let mut suggestions = Vec::new();

    let large_queries = corpus
        .sql
        .iter()
        .filter(|sql| sql.cleaned_sql.chars().count() > thresholds.large_query_chars)
        .count();
    if large_queries > 0 {
        suggestions.push(format!(
            "Consider breaking down {} complex SQL queries into smaller CTEs",
            large_queries
        ));
    }

    let mut access_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for table in corpus.sql.iter().flat_map(|sql| sql.tables.iter()) {
        *access_counts.entry(table.as_str()).or_default() += 1;
    }
    let busy: Vec<&str> = access_counts
        .into_iter()
        .filter(|(_, count)| *count > thresholds.table_access_count)
        .map(|(table, _)| table)
        .collect();
    if !busy.is_empty() {
        suggestions.push(format!(
            "Tables {} are accessed multiple times - consider staging models",
            busy.iter()
                .take(NAMED_TABLES)
                .copied()
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    if corpus
        .tables
        .iter()
        .any(|t| t.contains("date") || t.contains("timestamp"))
    {
        suggestions.push(
            "Consider adding partitioning on date/timestamp columns for better performance"
                .to_string(),
        );
    }

    let complex_expressions = corpus
        .transforms
        .iter()
        .filter(|t| t.expression.chars().count() > thresholds.complex_expression_chars)
        .count();
    if complex_expressions > 0 {
        suggestions.push(format!(
            "Found {} complex expressions - consider using DBT macros for reusability",
            complex_expressions
        ));
    }

    suggestions
}

/// Sample queries for checking migrated data.
///
/// Row counts for the first tables in sorted order, schema probes for the
/// SELECT statements among the first deduplicated queries, and null checks
/// for the first distinct output columns in extraction order.
pub fn validation_queries(corpus: &Corpus, config: &ExtractorConfig) -> Vec<ValidationQuery> {
    let limits = &config.validation;
    let mut queries = Vec::new();

    for table in corpus.tables.iter().take(limits.row_count_tables) {
        queries.push(ValidationQuery::RowCount {
            table: table.clone(),
            query: format!("SELECT COUNT(*) as row_count FROM {}", table),
            description: format!("Validate row count for {}", table),
        });
    }

    for sql in corpus
        .sql
        .iter()
        .take(limits.schema_probe_queries)
        .filter(|sql| sql.operation == SqlOperation::Select)
    {
        queries.push(ValidationQuery::SchemaValidation {
            component: sql.component_name.clone(),
            query: format!("SELECT * FROM ({}) LIMIT 0", sql.cleaned_sql),
            description: format!("Validate schema for {}", sql.component_name),
        });
    }

    let mut seen = BTreeSet::new();
    let columns = corpus
        .transforms
        .iter()
        .map(|t| t.output_column.as_str())
        .filter(|column| !column.is_empty() && seen.insert(*column))
        .take(limits.null_check_columns);
    for column in columns {
        queries.push(ValidationQuery::NullCheck {
            column: column.to_string(),
            query: format!("SELECT COUNT(*) FROM target_table WHERE {} IS NULL", column),
            description: format!("Check for nulls in {}", column),
        });
    }

    queries
}

/// Recommendations for each migration phase.
pub fn migration_recommendations(
    corpus: &Corpus,
    config: &ExtractorConfig,
) -> MigrationRecommendations {
    let thresholds = &config.thresholds;
    let mut recommendations = MigrationRecommendations::default();

    if corpus.jobs.len() > thresholds.phased_migration_jobs {
        recommendations
            .pre_migration
            .push("Consider phased migration approach for large job count".to_string());
    }
    if !corpus.context_variables.is_empty() {
        recommendations.pre_migration.push(format!(
            "Document {} context variables and their mappings",
            corpus.context_variables.len()
        ));
    }

    if corpus.jobs.iter().any(|job| job.has_sub_job) {
        recommendations
            .during_migration
            .push("Maintain job orchestration hierarchy in DBT".to_string());
    }
    if corpus.jobs.iter().any(|job| job.has_reject_flows()) {
        recommendations
            .during_migration
            .push("Implement error handling patterns using DBT tests".to_string());
    }

    recommendations
        .post_migration
        .push("Run all validation queries to ensure data integrity".to_string());
    recommendations
        .post_migration
        .push("Set up monitoring for DBT model performance".to_string());
    if corpus.tables.len() > thresholds.documentation_tables {
        recommendations
            .post_migration
            .push("Create documentation for all migrated models".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::job::JobExtraction;
    use crate::models::sql::SqlExtraction;
    use crate::models::transform::TransformExpression;

    fn sql(component: &str, text: &str, operation: SqlOperation, tables: &[&str]) -> SqlExtraction {
        SqlExtraction {
            job_name: "job".to_string(),
            component_name: component.to_string(),
            component_type: "tDBInput".to_string(),
            operation,
            raw_sql: text.to_string(),
            cleaned_sql: text.to_string(),
            tables: tables.iter().map(|t| t.to_string()).collect(),
            context_variables: Vec::new(),
        }
    }

    fn transform(output: &str, expression: &str) -> TransformExpression {
        TransformExpression {
            job_name: "job".to_string(),
            component_name: "tMap_1".to_string(),
            input_column: None,
            output_column: output.to_string(),
            expression: expression.to_string(),
            data_type: "id_String".to_string(),
        }
    }

    #[test]
    fn test_performance_suggestions() {
        let corpus = Corpus {
            sql: vec![
                sql("a", &"x".repeat(1001), SqlOperation::Select, &["orders", "sales_date"]),
                sql("b", "SELECT 1", SqlOperation::Select, &["orders"]),
                sql("c", "SELECT 2", SqlOperation::Select, &["orders"]),
                sql("d", "SELECT 3", SqlOperation::Select, &["orders"]),
            ],
            tables: ["orders", "sales_date"].iter().map(|t| t.to_string()).collect(),
            transforms: vec![transform("total", &"y".repeat(101))],
            ..Default::default()
        };
        let suggestions = performance_suggestions(&corpus, &ExtractorConfig::default());
        assert_eq!(
            suggestions,
            vec![
                "Consider breaking down 1 complex SQL queries into smaller CTEs",
                "Tables orders are accessed multiple times - consider staging models",
                "Consider adding partitioning on date/timestamp columns for better performance",
                "Found 1 complex expressions - consider using DBT macros for reusability",
            ]
        );

        assert!(performance_suggestions(&Corpus::default(), &ExtractorConfig::default()).is_empty());
    }

    #[test]
    fn test_validation_queries() {
        let corpus = Corpus {
            sql: vec![
                sql("in", "SELECT id FROM orders", SqlOperation::Select, &["orders"]),
                sql("out", "orders", SqlOperation::Unknown, &[]),
            ],
            tables: ["orders".to_string()].into_iter().collect(),
            transforms: vec![transform("id", "a"), transform("id", "b"), transform("", "c")],
            ..Default::default()
        };
        let queries = validation_queries(&corpus, &ExtractorConfig::default());

        assert_eq!(queries.len(), 3);
        assert_eq!(
            queries[1],
            ValidationQuery::SchemaValidation {
                component: "in".to_string(),
                query: "SELECT * FROM (SELECT id FROM orders) LIMIT 0".to_string(),
                description: "Validate schema for in".to_string(),
            }
        );
        assert!(matches!(&queries[2], ValidationQuery::NullCheck { column, .. } if column == "id"));
    }

    #[test]
    fn test_migration_recommendations() {
        let mut orchestrator = JobExtraction::new("Master");
        orchestrator.has_sub_job = true;
        let corpus = Corpus {
            jobs: vec![orchestrator],
            ..Default::default()
        };
        let recommendations = migration_recommendations(&corpus, &ExtractorConfig::default());

        assert!(recommendations.pre_migration.is_empty());
        assert_eq!(
            recommendations.during_migration,
            vec!["Maintain job orchestration hierarchy in DBT"]
        );
        assert_eq!(recommendations.post_migration.len(), 2);
    }
}
