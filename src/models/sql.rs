//! SQL extraction model

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Data-manipulation statement kind used to refine CTE and block operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Merge,
}

impl StatementKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Merge => "MERGE",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "SELECT" => Some(StatementKind::Select),
            "INSERT" => Some(StatementKind::Insert),
            "UPDATE" => Some(StatementKind::Update),
            "DELETE" => Some(StatementKind::Delete),
            "MERGE" => Some(StatementKind::Merge),
            _ => None,
        }
    }
}

/// Detected operation kind of an extracted statement
///
/// Serialized with its upper-case label (`SELECT`, `CTE_INSERT`,
/// `BLOCK_UPDATE`, `DYNAMIC_SQL`, ...). `Unknown` means the statement needs
/// manual classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SqlOperation {
    Select,
    Insert,
    Update,
    Delete,
    Merge,
    Create,
    Drop,
    Alter,
    Truncate,
    Begin,
    Declare,
    Exec,
    Execute,
    /// `WITH ...` followed by the given statement
    Cte(StatementKind),
    MergeUsing,
    MultiStatement,
    /// `BEGIN ... END` block containing a single kind of statement
    Block(StatementKind),
    SelectWindow,
    WindowFunction,
    Unload,
    Copy,
    DynamicSql,
    Unknown,
}

impl SqlOperation {
    /// Whether the operation modifies rows and therefore needs atomicity
    /// inside a transaction.
    pub fn is_data_modifying(&self) -> bool {
        matches!(
            self,
            SqlOperation::Insert | SqlOperation::Update | SqlOperation::Delete | SqlOperation::Merge
        )
    }
}

impl fmt::Display for SqlOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SqlOperation::Select => "SELECT",
            SqlOperation::Insert => "INSERT",
            SqlOperation::Update => "UPDATE",
            SqlOperation::Delete => "DELETE",
            SqlOperation::Merge => "MERGE",
            SqlOperation::Create => "CREATE",
            SqlOperation::Drop => "DROP",
            SqlOperation::Alter => "ALTER",
            SqlOperation::Truncate => "TRUNCATE",
            SqlOperation::Begin => "BEGIN",
            SqlOperation::Declare => "DECLARE",
            SqlOperation::Exec => "EXEC",
            SqlOperation::Execute => "EXECUTE",
            SqlOperation::Cte(kind) => return write!(f, "CTE_{}", kind.keyword()),
            SqlOperation::MergeUsing => "MERGE_USING",
            SqlOperation::MultiStatement => "MULTI_STATEMENT",
            SqlOperation::Block(kind) => return write!(f, "BLOCK_{}", kind.keyword()),
            SqlOperation::SelectWindow => "SELECT_WINDOW",
            SqlOperation::WindowFunction => "WINDOW_FUNCTION",
            SqlOperation::Unload => "UNLOAD",
            SqlOperation::Copy => "COPY",
            SqlOperation::DynamicSql => "DYNAMIC_SQL",
            SqlOperation::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

impl FromStr for SqlOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(kind) = s.strip_prefix("CTE_") {
            return StatementKind::from_keyword(kind)
                .map(SqlOperation::Cte)
                .ok_or_else(|| format!("Unknown SQL operation: {}", s));
        }
        if let Some(kind) = s.strip_prefix("BLOCK_") {
            return StatementKind::from_keyword(kind)
                .map(SqlOperation::Block)
                .ok_or_else(|| format!("Unknown SQL operation: {}", s));
        }
        match s {
            "SELECT" => Ok(SqlOperation::Select),
            "INSERT" => Ok(SqlOperation::Insert),
            "UPDATE" => Ok(SqlOperation::Update),
            "DELETE" => Ok(SqlOperation::Delete),
            "MERGE" => Ok(SqlOperation::Merge),
            "CREATE" => Ok(SqlOperation::Create),
            "DROP" => Ok(SqlOperation::Drop),
            "ALTER" => Ok(SqlOperation::Alter),
            "TRUNCATE" => Ok(SqlOperation::Truncate),
            "BEGIN" => Ok(SqlOperation::Begin),
            "DECLARE" => Ok(SqlOperation::Declare),
            "EXEC" => Ok(SqlOperation::Exec),
            "EXECUTE" => Ok(SqlOperation::Execute),
            "MERGE_USING" => Ok(SqlOperation::MergeUsing),
            "MULTI_STATEMENT" => Ok(SqlOperation::MultiStatement),
            "SELECT_WINDOW" => Ok(SqlOperation::SelectWindow),
            "WINDOW_FUNCTION" => Ok(SqlOperation::WindowFunction),
            "UNLOAD" => Ok(SqlOperation::Unload),
            "COPY" => Ok(SqlOperation::Copy),
            "DYNAMIC_SQL" => Ok(SqlOperation::DynamicSql),
            "UNKNOWN" => Ok(SqlOperation::Unknown),
            _ => Err(format!("Unknown SQL operation: {}", s)),
        }
    }
}

impl Serialize for SqlOperation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SqlOperation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// A query or table reference pulled out of one component parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlExtraction {
    pub job_name: String,
    pub component_name: String,
    pub component_type: String,
    pub operation: SqlOperation,
    /// Parameter value exactly as stored in the job definition
    pub raw_sql: String,
    /// Normalized statement text (dedup identity)
    pub cleaned_sql: String,
    /// Referenced tables, lower-cased and sorted
    pub tables: Vec<String>,
    /// Referenced context variables, sorted
    pub context_variables: Vec<String>,
}

/// Compact form of an extraction as it appears in the aggregate document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlQueryEntry {
    /// `"<component name> (<component type>)"`
    pub component: String,
    pub operation: SqlOperation,
    pub tables: Vec<String>,
    pub context_vars: Vec<String>,
    pub sql: String,
}

impl From<&SqlExtraction> for SqlQueryEntry {
    fn from(extraction: &SqlExtraction) -> Self {
        Self {
            component: format!(
                "{} ({})",
                extraction.component_name, extraction.component_type
            ),
            operation: extraction.operation,
            tables: extraction.tables.clone(),
            context_vars: extraction.context_variables.clone(),
            sql: extraction.cleaned_sql.clone(),
        }
    }
}
