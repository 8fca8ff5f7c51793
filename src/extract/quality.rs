//! Error-handling and data-quality extraction

use std::collections::BTreeMap;

use crate::models::job::{ComponentNode, ElementValue, JobDocument};
use crate::models::quality::{DataQualityRule, ErrorPattern, ErrorTrigger, LogMode};

/// Priority of a fatal error without a numeric `PRIORITY`
pub const DEFAULT_PRIORITY: i64 = 1;
/// Field separator of an audit log without `FIELDSEPARATOR`
pub const DEFAULT_SEPARATOR: &str = "|";

fn value_or_empty(node: &ComponentNode, name: &str) -> String {
    node.parameter_value(name).unwrap_or_default().to_string()
}

/// Error pattern of a `tDie`, `tWarn` or `tLogRow` component.
///
/// Fatal-error triggers are the connections nested in the node followed by
/// the job's connections that target it.
pub fn extract_error_pattern(job: &JobDocument, node: &ComponentNode) -> Option<ErrorPattern> {
    let component = node.unique_name.clone();
    match node.component_type.as_str() {
        "tDie" => {
            let priority = node
                .parameter_value("PRIORITY")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_PRIORITY);
            let triggers = node
                .connections
                .iter()
                .chain(job.incoming_connections(&node.unique_name))
                .map(|conn| ErrorTrigger {
                    source: conn.source.clone().unwrap_or_default(),
                    label: conn.label.clone().unwrap_or_default(),
                    connector: conn.connector_name.clone().unwrap_or_default(),
                })
                .collect();
            Some(ErrorPattern::FatalError {
                component,
                message: value_or_empty(node, "MESSAGE"),
                code: value_or_empty(node, "CODE"),
                priority,
                triggers,
            })
        }
        "tWarn" => Some(ErrorPattern::Warning {
            component,
            message: value_or_empty(node, "MESSAGE"),
            code: value_or_empty(node, "CODE"),
            continue_on_error: true,
        }),
        "tLogRow" => Some(ErrorPattern::AuditLog {
            component,
            mode: if node.flag("PRINT_CONTENT_WITH_LOG4J") {
                LogMode::Log4j
            } else {
                LogMode::Basic
            },
            separator: node
                .parameter_value("FIELDSEPARATOR")
                .unwrap_or(DEFAULT_SEPARATOR)
                .to_string(),
            print_header: node.flag("PRINT_HEADER"),
        }),
        _ => None,
    }
}

/// Group the cells of a table parameter into rows.
///
/// Each cell is assigned the first kind whose marker its `elementRef`
/// contains; cells matching no kind are ignored. A row closes as soon as a
/// kind already present in it repeats.
fn group_fragments<'a>(
    values: &'a [ElementValue],
    kinds: &[&'static str],
) -> Vec<BTreeMap<&'static str, &'a str>> {
    let mut groups = Vec::new();
    let mut current: BTreeMap<&'static str, &'a str> = BTreeMap::new();

    for value in values {
        let element_ref = value.element_ref.as_deref().unwrap_or_default();
        let Some(kind) = kinds.iter().copied().find(|k| element_ref.contains(k)) else {
            continue;
        };
        if current.contains_key(kind) {
            groups.push(std::mem::take(&mut current));
        }
        current.insert(kind, value.value.as_str());
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

fn field(group: &BTreeMap<&'static str, &str>, kind: &str) -> String {
    group.get(kind).copied().unwrap_or_default().to_string()
}

/// Validation rules encoded in a data-quality component.
pub fn extract_data_quality_rules(node: &ComponentNode) -> Vec<DataQualityRule> {
    match node.component_type.as_str() {
        "tSchemaComplianceCheck" => node
            .table_parameters("SCHEMA_COLUMN")
            .flat_map(|param| group_fragments(&param.values, &["COLUMN", "TYPE", "NULL"]))
            .map(|group| DataQualityRule::SchemaCompliance {
                column: field(&group, "COLUMN"),
                data_type: field(&group, "TYPE"),
                nullable: field(&group, "NULL"),
            })
            .collect(),
        "tFilterRow" => node
            .table_parameters("CONDITIONS")
            .next()
            .map(|param| {
                group_fragments(&param.values, &["COLUMN", "FUNCTION", "OPERATOR", "VALUE"])
                    .into_iter()
                    .map(|group| DataQualityRule::RowFilter {
                        column: field(&group, "COLUMN"),
                        function: field(&group, "FUNCTION"),
                        operator: field(&group, "OPERATOR"),
                        value: field(&group, "VALUE"),
                    })
                    .filter(|rule| matches!(rule, DataQualityRule::RowFilter { column, .. } if !column.is_empty()))
                    .collect()
            })
            .unwrap_or_default(),
        "tAggregateRow" => node
            .table_parameters("OPERATIONS")
            .next()
            .map(|param| {
                group_fragments(&param.values, &["OUTPUT", "FUNCTION", "INPUT", "NULL"])
                    .into_iter()
                    .map(|group| DataQualityRule::Aggregation {
                        output_column: field(&group, "OUTPUT"),
                        function: field(&group, "FUNCTION"),
                        input_column: field(&group, "INPUT"),
                        ignore_null: group
                            .get("NULL")
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "false".to_string()),
                    })
                    .filter(|rule| matches!(rule, DataQualityRule::Aggregation { function, .. } if !function.is_empty()))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{Connection, ElementParameter};

    fn param(name: &str, value: &str) -> ElementParameter {
        ElementParameter {
            name: name.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }

    fn table(name: &str, cells: &[(&str, &str)]) -> ElementParameter {
        ElementParameter {
            name: name.to_string(),
            field: Some("TABLE".to_string()),
            value: String::new(),
            values: cells
                .iter()
                .map(|(r, v)| ElementValue {
                    element_ref: Some(r.to_string()),
                    value: v.to_string(),
                })
                .collect(),
        }
    }

    fn node(component_type: &str, parameters: Vec<ElementParameter>) -> ComponentNode {
        ComponentNode {
            component_type: component_type.to_string(),
            unique_name: format!("{}_1", component_type),
            parameters,
            ..Default::default()
        }
    }

    #[test]
    fn test_fatal_error_with_triggers() {
        let mut job = JobDocument::new("job");
        job.connections.push(Connection {
            source: Some("tDBInput_1".to_string()),
            target: Some("tDie_1".to_string()),
            label: Some("OnComponentError".to_string()),
            connector_name: Some("COMPONENT_ERROR".to_string()),
        });
        job.connections.push(Connection {
            source: Some("tDBInput_1".to_string()),
            target: Some("tMap_1".to_string()),
            ..Default::default()
        });
        let die = node(
            "tDie",
            vec![param("MESSAGE", "\"Load failed\""), param("PRIORITY", "high")],
        );

        match extract_error_pattern(&job, &die) {
            Some(ErrorPattern::FatalError {
                message,
                priority,
                triggers,
                ..
            }) => {
                assert_eq!(message, "\"Load failed\"");
                assert_eq!(priority, DEFAULT_PRIORITY);
                assert_eq!(triggers.len(), 1);
                assert_eq!(triggers[0].connector, "COMPONENT_ERROR");
            }
            other => panic!("unexpected pattern: {:?}", other),
        }
    }

    #[test]
    fn test_warning_and_audit_log() {
        let job = JobDocument::new("job");
        let warn = node("tWarn", vec![param("CODE", "42")]);
        assert!(matches!(
            extract_error_pattern(&job, &warn),
            Some(ErrorPattern::Warning { code, continue_on_error: true, .. }) if code == "42"
        ));

        let log = node(
            "tLogRow",
            vec![param("PRINT_CONTENT_WITH_LOG4J", "true"), param("PRINT_HEADER", "true")],
        );
        assert_eq!(
            extract_error_pattern(&job, &log),
            Some(ErrorPattern::AuditLog {
                component: "tLogRow_1".to_string(),
                mode: LogMode::Log4j,
                separator: "|".to_string(),
                print_header: true,
            })
        );
        assert_eq!(extract_error_pattern(&job, &node("tMap", vec![])), None);
    }

    #[test]
    fn test_row_filter_groups() {
        let filter = node(
            "tFilterRow",
            vec![table(
                "CONDITIONS",
                &[
                    ("INPUT_COLUMN", "amount"),
                    ("FUNCTION", ""),
                    ("OPERATOR", ">"),
                    ("RVALUE", "0"),
                    ("INPUT_COLUMN", "status"),
                    ("OPERATOR", "=="),
                    ("RVALUE", "\"OK\""),
                    ("INPUT_COLUMN", ""),
                    ("OPERATOR", "=="),
                ],
            )],
        );
        let rules = extract_data_quality_rules(&filter);
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules[1],
            DataQualityRule::RowFilter {
                column: "status".to_string(),
                function: String::new(),
                operator: "==".to_string(),
                value: "\"OK\"".to_string(),
            }
        );
    }

    #[test]
    fn test_aggregation_requires_function() {
        let aggregate = node(
            "tAggregateRow",
            vec![table(
                "OPERATIONS",
                &[
                    ("OUTPUT_COLUMN", "total"),
                    ("FUNCTION", "sum"),
                    ("INPUT_COLUMN", "amount"),
                    ("IGNORE_NULL", "true"),
                    ("OUTPUT_COLUMN", "orphan"),
                ],
            )],
        );
        let rules = extract_data_quality_rules(&aggregate);
        assert_eq!(
            rules,
            vec![DataQualityRule::Aggregation {
                output_column: "total".to_string(),
                function: "sum".to_string(),
                input_column: "amount".to_string(),
                ignore_null: "true".to_string(),
            }]
        );
    }

    #[test]
    fn test_schema_compliance() {
        let check = node(
            "tSchemaComplianceCheck",
            vec![table(
                "SCHEMA_COLUMN",
                &[("SCHEMA_COLUMN", "id"), ("TYPE", "id_Integer"), ("NULLABLE", "false")],
            )],
        );
        assert_eq!(
            extract_data_quality_rules(&check),
            vec![DataQualityRule::SchemaCompliance {
                column: "id".to_string(),
                data_type: "id_Integer".to_string(),
                nullable: "false".to_string(),
            }]
        );
    }

    #[test]
    fn test_schema_compliance_keeps_empty_rows() {
        let check = node(
            "tSchemaComplianceCheck",
            vec![table(
                "SCHEMA_COLUMN",
                &[("SCHEMA_COLUMN", ""), ("TYPE", ""), ("SCHEMA_COLUMN", "id")],
            )],
        );
        assert_eq!(
            extract_data_quality_rules(&check),
            vec![
                DataQualityRule::SchemaCompliance {
                    column: String::new(),
                    data_type: String::new(),
                    nullable: String::new(),
                },
                DataQualityRule::SchemaCompliance {
                    column: "id".to_string(),
                    data_type: String::new(),
                    nullable: String::new(),
                },
            ]
        );
    }
}
