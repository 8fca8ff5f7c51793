//! Connection-lifecycle metadata and job-level performance hints

use crate::models::job::{ComponentNode, JobDocument};
use crate::models::performance::{
    CommitMode, ConnectionMetadata, MemorySettings, Parallelism, PerformanceHints,
};

pub const DEFAULT_COMMIT_INTERVAL: u64 = 1000;
pub const DEFAULT_BATCH_SIZE: u64 = 1000;
pub const DEFAULT_EXECUTOR_THREADS: u32 = 4;
pub const DEFAULT_UNIT_SIZE: u32 = 1;

/// Resource limit parameters and the keys they are reported under
const RESOURCE_LIMITS: &[(&str, &str)] = &[
    ("MAX_MEMORY", "max_memory"),
    ("TIMEOUT", "timeout"),
    ("MAX_ROWS", "max_rows"),
];

fn parse_or<T: std::str::FromStr>(value: &str, default: T) -> T {
    value.trim().trim_matches('"').parse().unwrap_or(default)
}

/// Settings of a connection open/close/commit/rollback component.
pub fn extract_connection_metadata(node: &ComponentNode) -> ConnectionMetadata {
    let mut meta = ConnectionMetadata::default();

    if let Some(value) = node.parameter_value("COMMIT_EVERY") {
        meta.commit_mode = CommitMode::Batch;
        meta.batch_settings.commit_interval = Some(parse_or(value, DEFAULT_COMMIT_INTERVAL));
    }

    if node.flag("USE_BATCH") {
        meta.batch_settings.enabled = Some(true);
        if let Some(value) = node.parameter_value("BATCH_SIZE") {
            meta.batch_settings.size = Some(parse_or(value, DEFAULT_BATCH_SIZE));
        }
    }

    if node.flag("ENABLE_PARALLEL_EXECUTION") {
        meta.parallel_hints.enabled = Some(true);
        if let Some(value) = node.parameter_value("NUMBER_OF_PARALLEL_EXECUTORS") {
            meta.parallel_hints.threads = Some(parse_or(value, DEFAULT_EXECUTOR_THREADS));
        }
    }

    for (param, key) in RESOURCE_LIMITS {
        if let Some(value) = node.parameter_value(param) {
            meta.resource_limits.insert(key.to_string(), value.to_string());
        }
    }

    meta.auto_commit = node
        .parameter_value("AUTO_COMMIT")
        .map(|v| v.is_empty() || v == "true");

    meta
}

/// Job-level performance settings, `None` when the job declares none.
///
/// Every parameter of the job is scanned, job-level ones first; a setting
/// declared more than once keeps its last value.
pub fn extract_performance_hints(job: &JobDocument) -> Option<PerformanceHints> {
    let mut hints = PerformanceHints::default();

    for param in job.all_parameters() {
        let value = param.value.as_str();
        match param.name.as_str() {
            "JOB_RUN_VM_ARGUMENTS" => {
                hints
                    .memory_settings
                    .get_or_insert_with(MemorySettings::default)
                    .jvm_args = Some(value.to_string());
            }
            "JOB_RUN_VM_ARGUMENTS_OPTION" => {
                hints
                    .memory_settings
                    .get_or_insert_with(MemorySettings::default)
                    .custom_jvm = Some(value == "true");
            }
            "MULTI_THREAD_EXECUTION" => {
                hints
                    .parallelism
                    .get_or_insert_with(Parallelism::default)
                    .enabled = Some(value == "true");
            }
            "PARALLELIZE_UNIT_SIZE" => {
                hints
                    .parallelism
                    .get_or_insert_with(Parallelism::default)
                    .unit_size = Some(parse_or(value, DEFAULT_UNIT_SIZE));
            }
            "IMPLICIT_TCONTEXTLOAD" => hints.optimization_flags.push("implicit_context_load".to_string()),
            "UPDATE_COMPONENTS" => hints.optimization_flags.push("auto_update_components".to_string()),
            _ => {}
        }
    }

    (!hints.is_empty()).then_some(hints)
}
