//! SQL script exporter
//!
//! Renders the deduplicated SQL list as one script, each statement preceded
//! by comments naming where it came from.

use crate::corpus::Corpus;

/// Render the SQL script of a corpus.
///
/// # Arguments
///
/// * `corpus` - Merged corpus; its deduplicated SQL list is rendered in order
///
/// # Returns
///
/// The script text. An empty corpus yields the header only.
pub fn render_sql_script(corpus: &Corpus) -> String {
    let mut script = String::new();

    script.push_str("-- SQL EXTRACTION\n");
    script.push_str(&format!("-- Total Queries: {}\n", corpus.sql.len()));
    script.push_str(&format!("-- Unique Tables: {}\n", corpus.tables.len()));
    script.push_str(&format!("-- {}\n\n", "=".repeat(50)));

    for (i, sql) in corpus.sql.iter().enumerate() {
        script.push_str(&format!(
            "-- Query {}: {}.{}\n",
            i + 1,
            sql.job_name,
            sql.component_name
        ));
        script.push_str(&format!("-- Operation: {}\n", sql.operation));
        script.push_str(&format!("-- Tables: {}\n", sql.tables.join(", ")));
        if !sql.context_variables.is_empty() {
            script.push_str(&format!(
                "-- Context Variables: {}\n",
                sql.context_variables.join(", ")
            ));
        }
        script.push_str(&format!("\n{};\n\n", sql.cleaned_sql));
        script.push_str(&format!("-- {}\n\n", "-".repeat(50)));
    }

    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sql::{SqlExtraction, SqlOperation};

    #[test]
    fn test_render_sql_script() {
        let corpus = Corpus {
            sql: vec![SqlExtraction {
                job_name: "LoadOrders".to_string(),
                component_name: "tDBInput_1".to_string(),
                component_type: "tDBInput".to_string(),
                operation: SqlOperation::Select,
                raw_sql: String::new(),
                cleaned_sql: "SELECT * FROM orders WHERE d = '\"+context.run_date+\"'"
                    .to_string(),
                tables: vec!["orders".to_string()],
                context_variables: vec!["run_date".to_string()],
            }],
            tables: ["orders".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let script = render_sql_script(&corpus);

        assert!(script.starts_with("-- SQL EXTRACTION\n-- Total Queries: 1\n-- Unique Tables: 1\n"));
        assert!(script.contains("-- Query 1: LoadOrders.tDBInput_1\n-- Operation: SELECT\n-- Tables: orders\n-- Context Variables: run_date\n"));
        assert!(script.contains("\nSELECT * FROM orders WHERE d = '\"+context.run_date+\"';\n\n"));
        assert!(script.ends_with(&format!("-- {}\n\n", "-".repeat(50))));
    }

    #[test]
    fn test_empty_corpus_renders_header() {
        let script = render_sql_script(&Corpus::default());
        assert_eq!(script.lines().count(), 5);
        assert!(!script.contains("Query 1"));
    }
}
