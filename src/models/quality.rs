//! Error-handling and data-quality model

use serde::{Deserialize, Serialize};

/// Upstream connection that fires a fatal-error component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorTrigger {
    pub source: String,
    pub label: String,
    pub connector: String,
}

/// Output mode of an audit-log component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    #[default]
    Basic,
    Log4j,
}

/// Error-handling configuration of one error/audit component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorPattern {
    FatalError {
        component: String,
        message: String,
        code: String,
        priority: i64,
        triggers: Vec<ErrorTrigger>,
    },
    Warning {
        component: String,
        message: String,
        code: String,
        continue_on_error: bool,
    },
    AuditLog {
        component: String,
        mode: LogMode,
        separator: String,
        print_header: bool,
    },
}

impl ErrorPattern {
    pub fn component(&self) -> &str {
        match self {
            ErrorPattern::FatalError { component, .. }
            | ErrorPattern::Warning { component, .. }
            | ErrorPattern::AuditLog { component, .. } => component,
        }
    }
}

/// Validation rule derived from a data-quality component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataQualityRule {
    SchemaCompliance {
        column: String,
        data_type: String,
        nullable: String,
    },
    RowFilter {
        column: String,
        function: String,
        operator: String,
        value: String,
    },
    Aggregation {
        output_column: String,
        function: String,
        input_column: String,
        ignore_null: String,
    },
}
