//! Job discovery and loading tests

use std::fs;
use tempfile::tempdir;

use etl_extraction_sdk::import::{
    CorpusStats, DirectorySource, ImportError, JobLoader, JobSource, WhitespaceTokenizer,
};

const MINIMAL_JOB: &str = r#"<ProcessType><node componentName="tDBInput" uniqueName="tDBInput_1"/></ProcessType>"#;

mod directory_source_tests {
    use super::*;

    #[test]
    fn test_lists_matching_files_recursively_in_sorted_order() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("process/sales")).unwrap();
        fs::write(dir.path().join("process/sales/Load_B.item"), MINIMAL_JOB).unwrap();
        fs::write(dir.path().join("process/Load_A.item"), MINIMAL_JOB).unwrap();
        fs::write(dir.path().join("process/Load_A.properties"), "ignored").unwrap();

        let source = DirectorySource::new(dir.path());
        let paths = source.list_jobs().unwrap();

        assert_eq!(
            paths,
            vec![
                dir.path().join("process/Load_A.item"),
                dir.path().join("process/sales/Load_B.item"),
            ]
        );
    }

    #[test]
    fn test_custom_extensions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("job.xml"), MINIMAL_JOB).unwrap();
        fs::write(dir.path().join("job.item"), MINIMAL_JOB).unwrap();

        let source = DirectorySource::with_extensions(dir.path(), ["xml"]);
        let paths = source.list_jobs().unwrap();
        assert_eq!(paths, vec![dir.path().join("job.xml")]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let source = DirectorySource::new(dir.path().join("missing"));
        assert!(matches!(source.list_jobs(), Err(ImportError::IoError(_))));
    }
}

mod job_loader_tests {
    use super::*;

    #[test]
    fn test_load_skips_malformed_jobs() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Good.item"), MINIMAL_JOB).unwrap();
        fs::write(dir.path().join("Broken.item"), "<ProcessType><node>").unwrap();

        let result = JobLoader::new(DirectorySource::new(dir.path()))
            .load()
            .unwrap();

        assert_eq!(result.jobs.len(), 1);
        assert_eq!(result.jobs[0].name, "Good");
        assert_eq!(result.jobs[0].nodes[0].unique_name, "tDBInput_1");
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].path, dir.path().join("Broken.item"));
    }

    #[test]
    fn test_empty_directory_loads_nothing() {
        let dir = tempdir().unwrap();
        let result = JobLoader::new(DirectorySource::new(dir.path()))
            .load()
            .unwrap();
        assert!(result.jobs.is_empty());
        assert!(result.failures.is_empty());
    }
}

mod stats_tests {
    use super::*;

    #[test]
    fn test_source_stats() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("A.item"), "one two three").unwrap();
        fs::write(dir.path().join("B.item"), "four five").unwrap();

        let source = DirectorySource::new(dir.path());
        let stats = CorpusStats::from_source("Source", &source, &WhitespaceTokenizer).unwrap();

        assert_eq!(stats.label, "Source");
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.total_size_bytes, 22);
        assert_eq!(stats.total_tokens, 5);
        assert_eq!(stats.files[0].name, "A.item");
    }
}

mod duplicate_name_tests {
    use super::*;
    use etl_extraction_sdk::corpus::CorpusExtractor;

    fn job_with_query(query: &str) -> String {
        format!(
            r#"<ProcessType><node componentName="tDBInput" uniqueName="tDBInput_1"><elementParameter name="QUERY" value="&quot;{}&quot;"/></node></ProcessType>"#,
            query
        )
    }

    #[test]
    fn test_same_stem_in_different_folders_keeps_both_jobs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(
            dir.path().join("a/Load.item"),
            job_with_query("SELECT * FROM sales.orders"),
        )
        .unwrap();
        fs::write(
            dir.path().join("b/Load.item"),
            job_with_query("SELECT * FROM hr.people"),
        )
        .unwrap();

        let output = CorpusExtractor::default()
            .extract_directory(dir.path())
            .unwrap();

        let jobs: Vec<&str> = output.corpus.jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(jobs, vec!["Load", "Load_2"]);
        assert_eq!(output.corpus.sql.len(), 2);
        assert_eq!(output.corpus.sql[0].cleaned_sql, "SELECT * FROM sales.orders");
        assert_eq!(output.corpus.sql[1].job_name, "Load_2");
        assert!(output.corpus.tables.contains("orders"));
        assert!(output.corpus.tables.contains("people"));
        assert_eq!(output.document.jobs_summary.len(), 2);
    }
}
