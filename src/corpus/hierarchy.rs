//! Job hierarchy inference and complexity scoring

use crate::extract::job::JobExtraction;
use crate::models::corpus::JobRole;

/// Role of a job from its name and whether it invokes sub-jobs.
///
/// Name markers are checked case-insensitively in the order `grandmaster`,
/// `master`, `child` and take precedence over sub-job invocation.
pub fn infer_role(job_name: &str, has_sub_job: bool) -> JobRole {
    let name = job_name.to_lowercase();
    if name.contains("grandmaster") {
        JobRole::OrchestratorTop
    } else if name.contains("master") {
        JobRole::OrchestratorMid
    } else if name.contains("child") {
        JobRole::Processor
    } else if has_sub_job {
        JobRole::Orchestrator
    } else {
        JobRole::Processor
    }
}

/// `2 x components + 3 x SQL + 5 x transforms + distinct tables`, over the
/// job's own counts before corpus deduplication.
pub fn complexity_score(job: &JobExtraction) -> usize {
    job.component_count * 2 + job.sql.len() * 3 + job.transforms.len() * 5 + job.tables.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sql::{SqlExtraction, SqlOperation};
    use crate::models::transform::TransformExpression;

    #[test]
    fn test_name_markers_take_precedence() {
        assert_eq!(infer_role("Grandmaster_Sales", false), JobRole::OrchestratorTop);
        assert_eq!(infer_role("SalesMASTER", false), JobRole::OrchestratorMid);
        assert_eq!(infer_role("ChildLoad_01", true), JobRole::Processor);
        assert_eq!(infer_role("LoadAll", true), JobRole::Orchestrator);
        assert_eq!(infer_role("LoadOrders", false), JobRole::Processor);
    }

    #[test]
    fn test_complexity_score() {
        let mut job = JobExtraction::new("job");
        job.component_count = 3;
        job.sql = vec![
            SqlExtraction {
                job_name: "job".to_string(),
                component_name: "in".to_string(),
                component_type: "tDBInput".to_string(),
                operation: SqlOperation::Select,
                raw_sql: String::new(),
                cleaned_sql: String::new(),
                tables: Vec::new(),
                context_variables: Vec::new(),
            };
            2
        ];
        job.transforms = vec![TransformExpression {
            job_name: "job".to_string(),
            component_name: "map".to_string(),
            input_column: None,
            output_column: "out".to_string(),
            expression: "a + b".to_string(),
            data_type: "id_String".to_string(),
        }];
        job.tables.insert("orders".to_string());
        job.tables.insert("customers".to_string());

        // 6 + 6 + 5 + 2
        assert_eq!(complexity_score(&job), 19);
    }
}
