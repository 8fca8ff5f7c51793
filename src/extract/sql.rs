//! SQL extraction and normalization
//!
//! Pulls query and table text out of component parameters, cleans the Java
//! string-literal artifacts the job designer leaves behind, and classifies
//! each statement.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::models::job::ComponentNode;
use crate::models::sql::{SqlExtraction, SqlOperation, StatementKind};

/// Parameters that carry query or table text, in scan order
pub const SQL_PARAMETERS: &[&str] = &[
    "QUERY",
    "DBTABLE",
    "TABLE",
    "DBQUERY",
    "SQL_QUERY",
    "QUERY_BAND",
];

/// Words the table patterns can capture that are never table names
const TABLE_STOPLIST: &[&str] = &[
    "select", "from", "where", "join", "on", "as", "and", "or", "not", "null", "case", "when",
    "then", "else", "end", "using", "set", "values", "into",
];

static RE_CONCAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""\s*\+\s*""#).expect("Invalid regex"));
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Table patterns in priority order
static TABLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "+context.schema+".table
        r#"(?i)"\+[^+]+\+"\s*\.\s*([a-zA-Z_][a-zA-Z0-9_]*)"#,
        // ${context.schema}.table
        r"(?i)\$\{[^}]+\}\s*\.\s*([a-zA-Z_][a-zA-Z0-9_]*)",
        // keyword, optional schema qualifier, table
        r"(?i)(?:FROM|JOIN|INTO|UPDATE|DELETE\s+FROM)\s+(?:\w+\.)?\s*([a-zA-Z_][a-zA-Z0-9_]*)",
        // keyword, bare table
        r"(?i)(?:FROM|JOIN|INTO|UPDATE|DELETE)\s+([a-zA-Z_][a-zA-Z0-9_]*)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

/// Shape of a generated component label such as `tDBInput_1`
static RE_COMPONENT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^t[A-Z][a-zA-Z]+_\d+$").expect("Invalid regex"));

static CONTEXT_VAR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\$\{context\.([^}]+)\}",
        r#""\+context\.([^+]+)\+""#,
        r"'\+context\.([^+]+)\+'",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

static RE_WINDOW: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bOVER\s*\(").expect("Invalid regex"));
static RE_CONTEXT_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)context\.\w+").expect("Invalid regex"));

/// Leading keywords, checked with `starts_with` in this order
const LEADING_KEYWORDS: &[(&str, SqlOperation)] = &[
    ("SELECT", SqlOperation::Select),
    ("INSERT", SqlOperation::Insert),
    ("UPDATE", SqlOperation::Update),
    ("DELETE", SqlOperation::Delete),
    ("MERGE", SqlOperation::Merge),
    ("CREATE", SqlOperation::Create),
    ("DROP", SqlOperation::Drop),
    ("ALTER", SqlOperation::Alter),
    ("TRUNCATE", SqlOperation::Truncate),
    ("WITH", SqlOperation::Cte(StatementKind::Select)),
    ("BEGIN", SqlOperation::Begin),
    ("DECLARE", SqlOperation::Declare),
    ("EXEC", SqlOperation::Exec),
    ("EXECUTE", SqlOperation::Execute),
];

/// Statement kinds a CTE can lead into, checked in this order
const CTE_TARGETS: &[StatementKind] = &[
    StatementKind::Insert,
    StatementKind::Update,
    StatementKind::Delete,
    StatementKind::Merge,
];

/// Statement kinds counted inside a `BEGIN ... END` block, in this order
const BLOCK_STATEMENTS: &[StatementKind] = &[
    StatementKind::Update,
    StatementKind::Delete,
    StatementKind::Insert,
    StatementKind::Merge,
];

/// One secondary detection heuristic
pub struct OperationRule {
    pub name: &'static str,
    /// Receives the upper-cased trimmed text and the original text
    pub detect: fn(&str, &str) -> Option<SqlOperation>,
}

/// Heuristics applied when no leading keyword matches, first match wins
pub static OPERATION_RULES: &[OperationRule] = &[
    OperationRule {
        name: "merge_using",
        detect: |upper, _| {
            (upper.contains("MERGE") && upper.contains("USING")).then_some(SqlOperation::MergeUsing)
        },
    },
    OperationRule {
        name: "block",
        detect: |upper, _| {
            if !(upper.contains("BEGIN") && upper.contains("END")) {
                return None;
            }
            let found: Vec<StatementKind> = BLOCK_STATEMENTS
                .iter()
                .copied()
                .filter(|kind| upper.contains(kind.keyword()))
                .collect();
            match found.as_slice() {
                [] => None,
                [single] => Some(SqlOperation::Block(*single)),
                _ => Some(SqlOperation::MultiStatement),
            }
        },
    },
    OperationRule {
        name: "window",
        detect: |upper, _| {
            RE_WINDOW.is_match(upper).then(|| {
                if upper.starts_with("SELECT") {
                    SqlOperation::SelectWindow
                } else {
                    SqlOperation::WindowFunction
                }
            })
        },
    },
    OperationRule {
        name: "unload",
        detect: |upper, _| upper.contains("UNLOAD").then_some(SqlOperation::Unload),
    },
    OperationRule {
        name: "copy",
        detect: |upper, _| {
            (upper.contains("COPY") && (upper.contains("FROM") || upper.contains("TO")))
                .then_some(SqlOperation::Copy)
        },
    },
    OperationRule {
        name: "dynamic_sql",
        detect: |_, original| RE_CONTEXT_REF.is_match(original).then_some(SqlOperation::DynamicSql),
    },
];

/// Whether a raw parameter value is an empty sentinel
pub fn is_blank_value(raw: &str) -> bool {
    raw.is_empty() || raw == "\"\"" || raw == "null"
}

/// Normalize raw parameter text.
///
/// Strips wrapping quotes, unescapes `\"`, `\n` and `\t`, joins adjacent
/// string-literal fragments (`" + "`) and collapses whitespace.
pub fn clean_sql(raw: &str) -> String {
    let text = raw.trim_matches('"').trim();
    let text = text
        .replace("\\\"", "\"")
        .replace("\\n", "\n")
        .replace("\\t", "  ");
    let text = RE_CONCAT.replace_all(&text, "");
    let text = RE_WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Table names referenced by cleaned SQL, lower-cased and sorted.
pub fn extract_tables(sql: &str) -> Vec<String> {
    let mut tables = BTreeSet::new();
    for pattern in TABLE_PATTERNS.iter() {
        for caps in pattern.captures_iter(sql) {
            let Some(table) = caps.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if RE_COMPONENT_LABEL.is_match(table) {
                continue;
            }
            let lower = table.to_lowercase();
            if !TABLE_STOPLIST.contains(&lower.as_str()) {
                tables.insert(lower);
            }
        }
    }
    tables.into_iter().collect()
}

/// Context variable names referenced by cleaned SQL, sorted and deduplicated.
pub fn extract_context_vars(sql: &str) -> Vec<String> {
    let mut vars = BTreeSet::new();
    for pattern in CONTEXT_VAR_PATTERNS.iter() {
        for caps in pattern.captures_iter(sql) {
            if let Some(name) = caps.get(1) {
                vars.insert(name.as_str().to_string());
            }
        }
    }
    vars.into_iter().collect()
}

/// Classify a statement.
///
/// Unrecognized and empty text yields [`SqlOperation::Unknown`].
pub fn detect_operation(sql: &str) -> SqlOperation {
    let upper = sql.to_uppercase();
    let upper = upper.trim();

    if let Some(&(keyword, operation)) = LEADING_KEYWORDS
        .iter()
        .find(|(keyword, _)| upper.starts_with(keyword))
    {
        return match keyword {
            "WITH" => CTE_TARGETS
                .iter()
                .find(|kind| upper.contains(kind.keyword()))
                .map(|kind| SqlOperation::Cte(*kind))
                .unwrap_or(operation),
            "SELECT" if RE_WINDOW.is_match(upper) => SqlOperation::SelectWindow,
            _ => operation,
        };
    }

    OPERATION_RULES
        .iter()
        .find_map(|rule| (rule.detect)(upper, sql))
        .unwrap_or(SqlOperation::Unknown)
}

/// Every query-bearing parameter of a component, cleaned and classified.
pub fn extract_component_sql(job_name: &str, node: &ComponentNode) -> Vec<SqlExtraction> {
    SQL_PARAMETERS
        .iter()
        .flat_map(|&name| node.parameters_named(name))
        .filter(|param| !is_blank_value(&param.value))
        .map(|param| {
            let cleaned = clean_sql(&param.value);
            SqlExtraction {
                job_name: job_name.to_string(),
                component_name: node.unique_name.clone(),
                component_type: node.component_type.clone(),
                operation: detect_operation(&cleaned),
                raw_sql: param.value.clone(),
                tables: extract_tables(&cleaned),
                context_variables: extract_context_vars(&cleaned),
                cleaned_sql: cleaned,
            }
        })
        .collect()
}
