//! Job document importer
//!
//! Converts a parsed XML tree into a [`JobDocument`] in one pass. Only the
//! element kinds the extractors consume are retained: `node`, job-level
//! `elementParameter`, `connection` and `context`.

use crate::models::job::{
    ComponentNode, Connection, ContextDefinition, ContextParameter, ElementParameter,
    ElementValue, GlobalMapKey, JobDocument, MapperData, MapperEntry, MapperInputTable,
    MapperOutputTable, MapperVarTable, MetadataColumn, Position, SchemaMetadata,
};

use super::ImportError;
use super::xml::XmlElement;

/// Job definition importer
///
/// Imports job definition XML content into a [`JobDocument`].
#[derive(Debug, Default)]
pub struct JobImporter;

impl JobImporter {
    /// Create a new job importer
    pub fn new() -> Self {
        Self
    }

    /// Import job definition XML content.
    ///
    /// # Arguments
    ///
    /// * `job_name` - Name of the job (usually the file stem).
    /// * `xml_content` - The job definition XML as a string.
    ///
    /// # Returns
    ///
    /// The typed job document, or an `ImportError` if the XML is malformed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use etl_extraction_sdk::import::JobImporter;
    ///
    /// let xml = r#"<ProcessType><node componentName="tDBInput" uniqueName="tDBInput_1"/></ProcessType>"#;
    /// let job = JobImporter::new().import("Load_Orders", xml).unwrap();
    /// assert_eq!(job.nodes[0].unique_name, "tDBInput_1");
    /// ```
    pub fn import(&self, job_name: &str, xml_content: &str) -> Result<JobDocument, ImportError> {
        let root = XmlElement::parse(xml_content)?;
        Ok(self.import_tree(job_name, &root))
    }

    /// Build a job document from an already parsed tree.
    pub fn import_tree(&self, job_name: &str, root: &XmlElement) -> JobDocument {
        let mut job = JobDocument::new(job_name);
        collect(root, &mut job);
        job
    }
}

fn collect(element: &XmlElement, job: &mut JobDocument) {
    for child in &element.children {
        match child.name.as_str() {
            "node" => {
                job.nodes.push(parse_node(child));
                // Nested components follow their parent in document order
                job.nodes.extend(child.descendants_named("node").map(parse_node));
            }
            "elementParameter" => job.parameters.push(parse_parameter(child)),
            "connection" => job.connections.push(parse_connection(child)),
            "context" => job.contexts.push(parse_context(child)),
            _ => collect(child, job),
        }
    }
}

fn opt_attr(element: &XmlElement, key: &str) -> Option<String> {
    element.attr(key).map(str::to_string)
}

fn parse_node(element: &XmlElement) -> ComponentNode {
    let parameters: Vec<ElementParameter> = element
        .descendants_named("elementParameter")
        .map(parse_parameter)
        .collect();

    let unique_name = match element.attr("uniqueName") {
        Some(name) => name.to_string(),
        None => parameters
            .iter()
            .find(|p| p.name == "UNIQUE_NAME")
            .map(|p| p.value.trim_matches('"').to_string())
            .unwrap_or_default(),
    };

    ComponentNode {
        component_type: element.attr_or_empty("componentName").to_string(),
        unique_name,
        position: Position {
            x: element.attr("posX").and_then(|v| v.parse().ok()).unwrap_or(0),
            y: element.attr("posY").and_then(|v| v.parse().ok()).unwrap_or(0),
        },
        parameters,
        metadata: element
            .descendants_named("metadata")
            .map(parse_metadata)
            .collect(),
        mapper: element
            .descendants_named("nodeData")
            .map(parse_mapper)
            .collect(),
        connections: element
            .descendants_named("connection")
            .map(parse_connection)
            .collect(),
    }
}

fn parse_parameter(element: &XmlElement) -> ElementParameter {
    ElementParameter {
        name: element.attr_or_empty("name").to_string(),
        field: opt_attr(element, "field"),
        value: element.attr_or_empty("value").to_string(),
        values: element
            .descendants_named("elementValue")
            .map(|v| ElementValue {
                element_ref: opt_attr(v, "elementRef"),
                value: v.attr_or_empty("value").to_string(),
            })
            .collect(),
    }
}

fn parse_metadata(element: &XmlElement) -> SchemaMetadata {
    SchemaMetadata {
        name: opt_attr(element, "name"),
        connector: opt_attr(element, "connector"),
        columns: element
            .descendants_named("column")
            .map(|c| MetadataColumn {
                name: c.attr_or_empty("name").to_string(),
                data_type: c.attr_or_empty("type").to_string(),
                nullable: c.attr("nullable").is_none_or(|v| v == "true"),
                expression: opt_attr(c, "expression"),
                original_db_column_name: opt_attr(c, "originalDbColumnName"),
            })
            .collect(),
    }
}

fn parse_mapper(element: &XmlElement) -> MapperData {
    MapperData {
        input_tables: element
            .descendants_named("inputTables")
            .map(|t| MapperInputTable {
                name: t.attr_or_empty("name").to_string(),
                matching_mode: opt_attr(t, "matchingMode"),
                lookup_mode: opt_attr(t, "lookupMode"),
                inner_join: t.attr_flag("innerJoin"),
                persistent: t.attr_flag("persistent"),
                sequence_order: opt_attr(t, "sequenceOrder"),
                cache_size_hint: opt_attr(t, "cacheSizeHint"),
                preload: t.attr_flag("preload"),
                expression_filter: opt_attr(t, "expressionFilter"),
                lookup_failure_expression: opt_attr(t, "lookupFailureExpression"),
                global_map_keys: t
                    .descendants_named("globalMapKeysValues")
                    .map(|k| GlobalMapKey {
                        key: k.attr_or_empty("key").to_string(),
                        value: k.attr_or_empty("value").to_string(),
                        null_option: k.attr_or_empty("nullOption").to_string(),
                    })
                    .collect(),
            })
            .collect(),
        output_tables: element
            .descendants_named("outputTables")
            .map(|t| MapperOutputTable {
                name: t.attr_or_empty("name").to_string(),
                expression_filter: opt_attr(t, "expressionFilter"),
                reject: t.attr_flag("reject"),
            })
            .collect(),
        var_tables: element
            .descendants_named("varTables")
            .map(|t| MapperVarTable {
                name: t.attr_or_empty("name").to_string(),
                entries: t
                    .descendants_named("mapperTableEntries")
                    .map(|e| MapperEntry {
                        name: e.attr_or_empty("name").to_string(),
                        expression: opt_attr(e, "expression"),
                        data_type: opt_attr(e, "type"),
                    })
                    .collect(),
            })
            .collect(),
        incoming_filters: element
            .descendants_named("filterIncomingConnections")
            .map(|f| f.attr_or_empty("value").to_string())
            .collect(),
    }
}

fn parse_connection(element: &XmlElement) -> Connection {
    Connection {
        source: opt_attr(element, "source"),
        target: opt_attr(element, "target"),
        label: opt_attr(element, "label"),
        connector_name: opt_attr(element, "connectorName"),
    }
}

fn parse_context(element: &XmlElement) -> ContextDefinition {
    ContextDefinition {
        name: element.attr_or_empty("name").to_string(),
        parameters: element
            .descendants_named("contextParameter")
            .map(|p| ContextParameter {
                name: p.attr_or_empty("name").to_string(),
                declared_type: p.attr_or_empty("type").to_string(),
                value: p.attr_or_empty("value").to_string(),
            })
            .collect(),
    }
}
