//! Transaction boundary detection
//!
//! A linear scan over a job's components in document order. A connection
//! component opens a group, data components of the same database families
//! join it, and a commit, rollback or close component ends it.

use std::collections::BTreeSet;
use tracing::warn;

use super::classifier::{DatabaseRole, database_role};
use super::sql::{clean_sql, detect_operation, extract_tables};
use crate::models::job::{ComponentNode, JobDocument};
use crate::models::sql::SqlOperation;
use crate::models::transaction::{
    TerminalKind, TransactionGroup, TransactionOperation, TransactionSummary,
};

/// Operation performed by a database data component.
pub fn component_operation(role: DatabaseRole, node: &ComponentNode) -> SqlOperation {
    match role {
        DatabaseRole::Input => SqlOperation::Select,
        DatabaseRole::Output => {
            let action = node
                .parameter_value("DATA_ACTION")
                .filter(|v| !v.is_empty())
                .unwrap_or("INSERT")
                .to_uppercase();
            if action.contains("INSERT") {
                SqlOperation::Insert
            } else if action.contains("UPDATE") {
                SqlOperation::Update
            } else if action.contains("DELETE") {
                SqlOperation::Delete
            } else if action.contains("UPSERT") || action.contains("MERGE") {
                SqlOperation::Merge
            } else {
                SqlOperation::Insert
            }
        }
        DatabaseRole::Row => node
            .parameter_value("QUERY")
            .map(|query| detect_operation(&clean_sql(query)))
            .unwrap_or(SqlOperation::Unknown),
        _ => SqlOperation::Unknown,
    }
}

/// Tables touched by a database data component, lower-cased and sorted.
pub fn component_tables(node: &ComponentNode) -> Vec<String> {
    let mut tables = BTreeSet::new();
    for name in ["TABLE", "DBTABLE"] {
        if let Some(value) = node.parameter_value(name) {
            let table = value.trim_matches('"');
            if !table.is_empty() && table != "null" {
                tables.insert(table.to_lowercase());
            }
        }
    }
    if let Some(query) = node.parameter_value("QUERY") {
        tables.extend(extract_tables(&clean_sql(query)));
    }
    tables.into_iter().collect()
}

/// Group being assembled while the scan is in the open state
struct OpenGroup {
    group: TransactionGroup,
    tables_modified: BTreeSet<String>,
}

impl OpenGroup {
    fn open(node: &ComponentNode) -> Self {
        let auto_commit = match node.parameter_value("AUTO_COMMIT") {
            None | Some("") => true,
            Some(value) => value == "true",
        };
        let batch_size = node
            .parameter_value("BATCH_SIZE")
            .and_then(|v| v.trim().trim_matches('"').parse().ok())
            .unwrap_or(0);

        Self {
            group: TransactionGroup {
                connection_component: node.unique_name.clone(),
                auto_commit,
                use_batch: node.flag("USE_BATCH"),
                batch_size,
                components: Vec::new(),
                tables_modified: Vec::new(),
                requires_atomicity: false,
                end_component: None,
                transaction_type: TerminalKind::ImplicitCommit,
            },
            tables_modified: BTreeSet::new(),
        }
    }

    fn push(&mut self, role: DatabaseRole, node: &ComponentNode) {
        let operation = component_operation(role, node);
        let tables = component_tables(node);
        if operation.is_data_modifying() {
            self.group.requires_atomicity = true;
            self.tables_modified.extend(tables.iter().cloned());
        }
        self.group.components.push(TransactionOperation {
            name: node.unique_name.clone(),
            component_type: node.component_type.clone(),
            operation,
            tables,
        });
    }

    fn finish(mut self, end_component: Option<String>, kind: TerminalKind) -> TransactionGroup {
        self.group.end_component = end_component;
        self.group.transaction_type = kind;
        self.group.tables_modified = self.tables_modified.into_iter().collect();
        self.group
    }
}

/// Detect the transaction groups of a job.
///
/// Returns `None` when the job has no group. A connection opened while a
/// group is still open replaces that group, which is dropped.
pub fn detect_transactions(job: &JobDocument) -> Option<TransactionSummary> {
    let mut groups = Vec::new();
    let mut current: Option<OpenGroup> = None;

    for node in &job.nodes {
        let Some(role) = database_role(&node.component_type) else {
            continue;
        };
        match role {
            DatabaseRole::Connection => {
                if let Some(previous) = current.take() {
                    warn!(
                        "Job {}: connection {} reopened before {} was closed, dropping {} operations",
                        job.name,
                        node.unique_name,
                        previous.group.connection_component,
                        previous.group.components.len()
                    );
                }
                current = Some(OpenGroup::open(node));
            }
            role if role.is_operation() => {
                if let Some(open) = current.as_mut() {
                    open.push(role, node);
                }
            }
            role if role.is_terminal() => {
                if let Some(open) = current.take() {
                    let kind = TerminalKind::from_component_type(&node.component_type);
                    groups.push(open.finish(Some(node.unique_name.clone()), kind));
                }
            }
            _ => {}
        }
    }

    if let Some(open) = current {
        groups.push(open.finish(None, TerminalKind::ImplicitCommit));
    }

    if groups.is_empty() {
        return None;
    }

    let tables: BTreeSet<String> = groups
        .iter()
        .flat_map(|g| g.tables_modified.iter().cloned())
        .collect();

    Some(TransactionSummary {
        atomic_operations_required: groups.iter().filter(|g| g.requires_atomicity).count(),
        tables_requiring_atomicity: tables.into_iter().collect(),
        transaction_groups: groups,
    })
}
