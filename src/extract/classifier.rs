//! Component classification
//!
//! Maps a component type string to the extractors that handle it.

/// Error and audit components
pub const ERROR_COMPONENTS: &[&str] = &["tDie", "tWarn", "tLogRow"];

/// Database families with connection lifecycle components
pub const DATABASE_FAMILIES: &[&str] = &["tDB", "tRedshift"];

/// Scaffolding, scripting and system components that carry no extractable logic
pub const EXCLUDED_COMPONENTS: &[&str] = &[
    "tPrejob",
    "tPostjob",
    "tPreJob",
    "tPostJob",
    "tStatCatcher",
    "tJava",
    "tSystem",
    "tSleep",
    "tContextLoad",
];

/// Components whose configuration encodes validation rules
pub const DATA_QUALITY_COMPONENTS: &[&str] =
    &["tSchemaComplianceCheck", "tFilterRow", "tAggregateRow"];

/// Field-mapping component
pub const TRANSFORM_COMPONENT: &str = "tMap";

/// Sub-job invocation component
pub const SUB_JOB_COMPONENT: &str = "tRunJob";

/// Role of a component within a database family (`tDBInput` is `Input`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseRole {
    Connection,
    Input,
    Output,
    Row,
    Commit,
    Rollback,
    Close,
}

impl DatabaseRole {
    /// Connection open/close/commit/rollback
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            DatabaseRole::Connection
                | DatabaseRole::Commit
                | DatabaseRole::Rollback
                | DatabaseRole::Close
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DatabaseRole::Commit | DatabaseRole::Rollback | DatabaseRole::Close
        )
    }

    pub fn is_operation(&self) -> bool {
        matches!(
            self,
            DatabaseRole::Input | DatabaseRole::Output | DatabaseRole::Row
        )
    }
}

/// Role of a database-family component, `None` for anything else.
pub fn database_role(component_type: &str) -> Option<DatabaseRole> {
    let suffix = DATABASE_FAMILIES
        .iter()
        .find_map(|family| component_type.strip_prefix(family))?;
    match suffix {
        "Connection" => Some(DatabaseRole::Connection),
        "Input" => Some(DatabaseRole::Input),
        "Output" => Some(DatabaseRole::Output),
        "Row" => Some(DatabaseRole::Row),
        "Commit" => Some(DatabaseRole::Commit),
        "Rollback" => Some(DatabaseRole::Rollback),
        "Close" => Some(DatabaseRole::Close),
        _ => None,
    }
}

/// Extractors that apply to a counted component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessingRoute {
    pub transform: bool,
    pub data_quality: bool,
    pub sub_job: bool,
}

/// Handling route of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRoute {
    /// Error or audit configuration; not counted
    ErrorHandling,
    /// Connection lifecycle settings; not counted
    ConnectionLifecycle,
    /// Dropped
    Excluded,
    /// Counted and scanned for SQL
    Processing(ProcessingRoute),
}

impl ComponentRoute {
    /// Classify a component type.
    ///
    /// Precedence: error set, connection lifecycle, excluded set, then
    /// everything else.
    pub fn classify(component_type: &str) -> Self {
        if ERROR_COMPONENTS.contains(&component_type) {
            return ComponentRoute::ErrorHandling;
        }
        if database_role(component_type).is_some_and(|role| role.is_lifecycle()) {
            return ComponentRoute::ConnectionLifecycle;
        }
        if EXCLUDED_COMPONENTS.contains(&component_type) {
            return ComponentRoute::Excluded;
        }
        ComponentRoute::Processing(ProcessingRoute {
            transform: component_type == TRANSFORM_COMPONENT,
            data_quality: DATA_QUALITY_COMPONENTS.contains(&component_type),
            sub_job: component_type == SUB_JOB_COMPONENT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(ComponentRoute::classify("tLogRow"), ComponentRoute::ErrorHandling);
        assert_eq!(
            ComponentRoute::classify("tRedshiftCommit"),
            ComponentRoute::ConnectionLifecycle
        );
        assert_eq!(ComponentRoute::classify("tPreJob"), ComponentRoute::Excluded);
        assert_eq!(
            ComponentRoute::classify("tMap"),
            ComponentRoute::Processing(ProcessingRoute {
                transform: true,
                ..Default::default()
            })
        );
        assert_eq!(
            ComponentRoute::classify("tRunJob"),
            ComponentRoute::Processing(ProcessingRoute {
                sub_job: true,
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_unknown_types_fall_through() {
        assert_eq!(
            ComponentRoute::classify("tSomethingNew"),
            ComponentRoute::Processing(ProcessingRoute::default())
        );
        assert_eq!(
            ComponentRoute::classify("tDBOutput"),
            ComponentRoute::Processing(ProcessingRoute::default())
        );
    }

    #[test]
    fn test_database_roles() {
        assert_eq!(database_role("tDBConnection"), Some(DatabaseRole::Connection));
        assert_eq!(database_role("tRedshiftRow"), Some(DatabaseRole::Row));
        assert_eq!(database_role("tDBOutputBulk"), None);
        assert_eq!(database_role("tMysqlInput"), None);
    }

    #[test]
    fn test_role_kinds() {
        for role in [DatabaseRole::Commit, DatabaseRole::Rollback, DatabaseRole::Close] {
            assert!(role.is_terminal());
            assert!(role.is_lifecycle());
            assert!(!role.is_operation());
        }
        assert!(!DatabaseRole::Connection.is_terminal());
        assert!(DatabaseRole::Connection.is_lifecycle());
        for role in [DatabaseRole::Input, DatabaseRole::Output, DatabaseRole::Row] {
            assert!(role.is_operation());
            assert!(!role.is_terminal());
        }
    }
}
