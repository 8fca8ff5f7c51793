//! Context variable model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of a context variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextCategory {
    Schema,
    DateFilter,
    Timestamp,
    FilePath,
    CloudStorage,
    Environment,
    Batch,
    Threshold,
    /// Name carries an environment prefix (`dev_`, `prod_`, ...)
    EnvironmentSpecific,
    Generic,
}

impl ContextCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextCategory::Schema => "schema",
            ContextCategory::DateFilter => "date_filter",
            ContextCategory::Timestamp => "timestamp",
            ContextCategory::FilePath => "file_path",
            ContextCategory::CloudStorage => "cloud_storage",
            ContextCategory::Environment => "environment",
            ContextCategory::Batch => "batch",
            ContextCategory::Threshold => "threshold",
            ContextCategory::EnvironmentSpecific => "environment_specific",
            ContextCategory::Generic => "generic",
        }
    }
}

impl fmt::Display for ContextCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a variable name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextClassification {
    pub category: ContextCategory,
    /// Target-parameter reference expression (e.g. `var('run_date')`)
    pub reference: String,
    /// Human-readable validation note
    pub validation: String,
}

/// A classified context variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextVariable {
    pub name: String,
    pub declared_type: String,
    pub default_value: String,
    pub category: ContextCategory,
    pub reference: String,
    pub validation: String,
}

/// Context mapping as it appears in the aggregate document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMappingEntry {
    #[serde(rename = "type")]
    pub declared_type: String,
    pub default: String,
    pub reference: String,
    pub category: ContextCategory,
    pub validation: String,
}

impl From<&ContextVariable> for ContextMappingEntry {
    fn from(var: &ContextVariable) -> Self {
        Self {
            declared_type: var.declared_type.clone(),
            default: var.default_value.clone(),
            reference: var.reference.clone(),
            category: var.category,
            validation: var.validation.clone(),
        }
    }
}
