//! Performance and connection-lifecycle configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Job-level performance settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_settings: Option<MemorySettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<Parallelism>,
    /// `implicit_context_load`, `auto_update_components`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optimization_flags: Vec<String>,
}

impl PerformanceHints {
    pub fn is_empty(&self) -> bool {
        self.memory_settings.is_none()
            && self.parallelism.is_none()
            && self.optimization_flags.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jvm_args: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_jvm: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parallelism {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_size: Option<u32>,
}

/// Commit behavior of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitMode {
    #[default]
    Auto,
    Batch,
}

/// Configuration of a connection open/close/commit/rollback component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionMetadata {
    pub commit_mode: CommitMode,
    pub batch_settings: BatchSettings,
    pub parallel_hints: ParallelHints,
    /// `max_memory`, `timeout` and `max_rows` when declared
    pub resource_limits: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_commit: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParallelHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
}
