//! Job document model
//!
//! Typed records for one job definition file. Every record is populated by a
//! single parsing pass over the XML tree (see [`crate::import::job`]) and is
//! read-only afterwards. Missing attributes are represented as `None`, empty
//! strings or `false` so extractors never have to deal with absent nodes.

use serde::{Deserialize, Serialize};

/// One job definition: the components of a single dataflow graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobDocument {
    /// Job name (file stem of the source document)
    pub name: String,
    /// Component nodes in document order
    pub nodes: Vec<ComponentNode>,
    /// Job-level parameters (element parameters outside any node)
    pub parameters: Vec<ElementParameter>,
    /// Root-level connections between components
    pub connections: Vec<Connection>,
    /// Context definitions (one per environment, e.g. Default / Prod)
    pub contexts: Vec<ContextDefinition>,
}

impl JobDocument {
    /// Create an empty job document with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Iterate over every element parameter of the job: job-level parameters
    /// first, then each node's parameters in document order.
    pub fn all_parameters(&self) -> impl Iterator<Item = &ElementParameter> {
        self.parameters
            .iter()
            .chain(self.nodes.iter().flat_map(|node| node.parameters.iter()))
    }

    /// Root-level connections whose target is the given component.
    pub fn incoming_connections<'a>(
        &'a self,
        component: &'a str,
    ) -> impl Iterator<Item = &'a Connection> {
        self.connections
            .iter()
            .filter(move |conn| conn.target.as_deref() == Some(component))
    }
}

/// Canvas position of a component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// A single component (node) of a job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentNode {
    /// Declared component type (`componentName`, e.g. `tDBInput`)
    pub component_type: String,
    /// Unique component name within the job (e.g. `tDBInput_1`)
    pub unique_name: String,
    pub position: Position,
    /// Element parameters in document order
    pub parameters: Vec<ElementParameter>,
    /// Schema metadata blocks
    pub metadata: Vec<SchemaMetadata>,
    /// Mapper data blocks (`nodeData`), only present on field-mapping components
    pub mapper: Vec<MapperData>,
    /// Connections nested inside the node element
    pub connections: Vec<Connection>,
}

impl ComponentNode {
    /// First parameter with the given name.
    pub fn parameter(&self, name: &str) -> Option<&ElementParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Value of the first parameter with the given name.
    ///
    /// Returns `None` when the parameter is absent. A parameter present without
    /// a `value` attribute yields `Some("")`.
    pub fn parameter_value(&self, name: &str) -> Option<&str> {
        self.parameter(name).map(|p| p.value.as_str())
    }

    /// All parameters with the given name, in document order.
    pub fn parameters_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ElementParameter> {
        self.parameters.iter().filter(move |p| p.name == name)
    }

    /// All table-shaped (`field="TABLE"`) parameters with the given name.
    pub fn table_parameters<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ElementParameter> {
        self.parameters_named(name).filter(|p| p.is_table())
    }

    /// `true` when the first parameter with this name has the value `true`.
    pub fn flag(&self, name: &str) -> bool {
        self.parameter_value(name) == Some("true")
    }
}

/// A named configuration slot of a component (`elementParameter`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementParameter {
    pub name: String,
    /// Field kind (`TEXT`, `CHECK`, `TABLE`, `MEMO_SQL`, ...)
    pub field: Option<String>,
    /// Raw value, empty when the attribute is absent
    pub value: String,
    /// Structured values for table-shaped parameters
    pub values: Vec<ElementValue>,
}

impl ElementParameter {
    /// Whether this is a structured table parameter
    pub fn is_table(&self) -> bool {
        self.field.as_deref() == Some("TABLE")
    }
}

/// One cell of a table-shaped parameter (`elementValue`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementValue {
    /// Column reference of the cell (e.g. `INPUT_COLUMN`, `FUNCTION`)
    pub element_ref: Option<String>,
    pub value: String,
}

/// Schema block attached to a component (`metadata`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaMetadata {
    pub name: Option<String>,
    /// Connector kind (`FLOW`, `OUTPUT`, `REJECT`, ...)
    pub connector: Option<String>,
    pub columns: Vec<MetadataColumn>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataColumn {
    pub name: String,
    pub data_type: String,
    /// Defaults to `true` when the attribute is absent
    pub nullable: bool,
    pub expression: Option<String>,
    pub original_db_column_name: Option<String>,
}

/// Field-mapping configuration of a tMap component (`nodeData`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapperData {
    pub input_tables: Vec<MapperInputTable>,
    pub output_tables: Vec<MapperOutputTable>,
    pub var_tables: Vec<MapperVarTable>,
    /// Values of `filterIncomingConnections` entries
    pub incoming_filters: Vec<String>,
}

/// An input (main or lookup) table of a mapper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapperInputTable {
    pub name: String,
    pub matching_mode: Option<String>,
    pub lookup_mode: Option<String>,
    pub inner_join: bool,
    pub persistent: bool,
    pub sequence_order: Option<String>,
    pub cache_size_hint: Option<String>,
    pub preload: bool,
    pub expression_filter: Option<String>,
    pub lookup_failure_expression: Option<String>,
    pub global_map_keys: Vec<GlobalMapKey>,
}

/// Join key of a lookup (`globalMapKeysValues`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalMapKey {
    pub key: String,
    pub value: String,
    pub null_option: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapperOutputTable {
    pub name: String,
    pub expression_filter: Option<String>,
    pub reject: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapperVarTable {
    pub name: String,
    pub entries: Vec<MapperEntry>,
}

/// A mapped field or intermediate variable (`mapperTableEntries`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapperEntry {
    pub name: String,
    pub expression: Option<String>,
    pub data_type: Option<String>,
}

/// Connection between two components (`connection`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source: Option<String>,
    pub target: Option<String>,
    pub label: Option<String>,
    /// Connector kind (`FLOW`, `FLOW_MAIN`, `SUBJOB_OK`, `COMPONENT_ERROR`, ...)
    pub connector_name: Option<String>,
}

/// A named set of context parameters (`context`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextDefinition {
    pub name: String,
    pub parameters: Vec<ContextParameter>,
}

/// A job-scoped variable (`contextParameter`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextParameter {
    pub name: String,
    pub declared_type: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, value: &str) -> ElementParameter {
        ElementParameter {
            name: name.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn parameter_lookup_returns_first_match() {
        let node = ComponentNode {
            parameters: vec![param("QUERY", "a"), param("QUERY", "b"), param("USE_BATCH", "true")],
            ..Default::default()
        };
        assert_eq!(node.parameter_value("QUERY"), Some("a"));
        assert_eq!(node.parameters_named("QUERY").count(), 2);
        assert!(node.flag("USE_BATCH"));
        assert!(!node.flag("AUTO_COMMIT"));
        assert_eq!(node.parameter_value("MISSING"), None);
    }

    #[test]
    fn all_parameters_lists_job_level_first() {
        let mut doc = JobDocument::new("job");
        doc.parameters.push(param("JOB_RUN_VM_ARGUMENTS", "-Xmx2g"));
        doc.nodes.push(ComponentNode {
            parameters: vec![param("QUERY", "select 1")],
            ..Default::default()
        });
        let names: Vec<&str> = doc.all_parameters().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["JOB_RUN_VM_ARGUMENTS", "QUERY"]);
    }
}
