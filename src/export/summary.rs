//! Plain-text summary report

use crate::models::corpus::AggregateDocument;

/// Render the summary report of an aggregate document.
///
/// Jobs are listed by role, then by name. Tables are listed in sorted order
/// with the operations and jobs of the deduplicated SQL that reference them.
pub fn render_summary(document: &AggregateDocument) -> String {
    let meta = &document.extraction_metadata;
    let mut report = String::new();

    report.push_str("EXTRACTION SUMMARY\n");
    report.push_str(&format!("{}\n\n", "=".repeat(50)));
    report.push_str(&format!("Jobs Processed: {}\n", meta.total_jobs));
    report.push_str(&format!("SQL Queries Extracted: {}\n", meta.total_sql_queries));
    report.push_str(&format!("Transformations (tMap): {}\n", meta.total_transformations));
    report.push_str(&format!("Unique Tables: {}\n", meta.unique_tables));
    report.push_str(&format!("Context Variables: {}\n\n", meta.context_variables));

    report.push_str("JOB HIERARCHY:\n");
    report.push_str(&format!("{}\n", "-".repeat(30)));
    let mut jobs: Vec<_> = document.job_hierarchy.iter().collect();
    jobs.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
    for (job, role) in jobs {
        report.push_str(&format!("{}: {}\n", job, role));
        if let Some(summary) = document.jobs_summary.get(job) {
            report.push_str(&format!(
                "  Components: {}, SQL: {}, tMap: {}\n",
                summary.components, summary.sql_queries, summary.transformations
            ));
        }
    }

    report.push_str("\nTABLE ANALYSIS:\n");
    report.push_str(&format!("{}\n", "-".repeat(30)));
    for table in &document.tables.all_tables {
        let usage = document
            .tables
            .table_operations
            .get(table)
            .cloned()
            .unwrap_or_default();
        report.push_str(&format!("{}:\n", table));
        report.push_str(&format!("  Operations: {}\n", usage.operations.join(", ")));
        report.push_str(&format!("  Used in {} jobs\n", usage.used_in_jobs.len()));
    }

    report
}
