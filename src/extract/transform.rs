//! Field-mapping (tMap) extraction
//!
//! Reconstructs the mapping structure of a tMap component and emits one
//! [`TransformExpression`] per mapped field and per intermediate variable.

use crate::models::job::{ComponentNode, MapperInputTable};
use crate::models::transform::{
    InputField, JoinKeyCondition, LookupDescriptor, OutputField, TransformExpression,
    TransformFilter, TransformStructure, TransformVariable,
};

/// Connector of mapper input schemas
pub const INPUT_CONNECTOR: &str = "FLOW";
/// Connector of mapper output schemas
pub const OUTPUT_CONNECTOR: &str = "OUTPUT";
/// Declared type of a variable without one
pub const DEFAULT_VARIABLE_TYPE: &str = "id_String";

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// Mapping structure of a tMap component.
pub fn extract_structure(node: &ComponentNode) -> TransformStructure {
    let mut structure = TransformStructure::default();

    for metadata in &node.metadata {
        let table = metadata.name.clone().unwrap_or_else(|| "default".to_string());
        match metadata.connector.as_deref() {
            Some(INPUT_CONNECTOR) => {
                let fields = metadata
                    .columns
                    .iter()
                    .map(|c| InputField {
                        name: c.name.clone(),
                        data_type: c.data_type.clone(),
                        nullable: c.nullable,
                    })
                    .collect();
                structure.input_schemas.insert(table, fields);
            }
            Some(OUTPUT_CONNECTOR) => {
                let fields = metadata
                    .columns
                    .iter()
                    .map(|c| OutputField {
                        name: c.name.clone(),
                        data_type: c.data_type.clone(),
                        expression: c.expression.clone().unwrap_or_default(),
                    })
                    .collect();
                structure.output_schemas.insert(table, fields);
            }
            _ => {}
        }
    }

    for mapper in &node.mapper {
        for filter in &mapper.incoming_filters {
            if !filter.is_empty() && filter != "true" {
                structure.filters.push(TransformFilter::InputFilter {
                    expression: filter.clone(),
                });
            }
        }

        for output in &mapper.output_tables {
            if let Some(expression) = non_empty(output.expression_filter.as_ref()) {
                structure.filters.push(TransformFilter::OutputFilter {
                    table: output.name.clone(),
                    expression,
                });
            }
            if output.reject {
                structure.reject_flows.push(output.name.clone());
            }
        }

        structure.lookups.extend(
            mapper
                .input_tables
                .iter()
                .enumerate()
                .filter_map(|(index, table)| lookup_descriptor(index, table)),
        );

        for entry in mapper.var_tables.iter().flat_map(|t| t.entries.iter()) {
            let Some(expression) = non_empty(entry.expression.as_ref()) else {
                continue;
            };
            if entry.name.is_empty() {
                continue;
            }
            let variable = TransformVariable {
                name: entry.name.clone(),
                expression,
                data_type: entry
                    .data_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_VARIABLE_TYPE.to_string()),
            };
            // A redefined variable keeps its first position
            match structure.variables.iter_mut().find(|v| v.name == variable.name) {
                Some(existing) => *existing = variable,
                None => structure.variables.push(variable),
            }
        }
    }

    structure
}

/// Lookup descriptor of a mapper input table, `None` unless it declares a
/// matching or lookup mode.
fn lookup_descriptor(index: usize, table: &MapperInputTable) -> Option<LookupDescriptor> {
    let matching_mode = table.matching_mode.clone().unwrap_or_default();
    let lookup_mode = table.lookup_mode.clone().unwrap_or_default();
    if matching_mode.is_empty() && lookup_mode.is_empty() {
        return None;
    }

    let priority = table
        .sequence_order
        .as_deref()
        .and_then(|order| order.trim().parse::<u32>().ok())
        .unwrap_or(index as u32);

    let join_keys = table
        .global_map_keys
        .iter()
        .map(|key| {
            (
                key.key.clone(),
                JoinKeyCondition {
                    value: key.value.clone(),
                    null_handling: key.null_option.clone(),
                },
            )
        })
        .collect();

    Some(LookupDescriptor {
        table: table.name.clone(),
        matching_mode,
        lookup_mode,
        inner_join: table.inner_join,
        persistent: table.persistent,
        priority,
        cache_size: non_empty(table.cache_size_hint.as_ref()),
        preload: table.preload,
        join_keys,
        expression_filter: non_empty(table.expression_filter.as_ref()),
        fallback_expression: non_empty(table.lookup_failure_expression.as_ref()),
    })
}

/// Field and variable expressions of a tMap component.
///
/// Schema columns come first, then variable entries. Both passes can report
/// the same field.
pub fn extract_expressions(job_name: &str, node: &ComponentNode) -> Vec<TransformExpression> {
    let columns = node
        .metadata
        .iter()
        .flat_map(|m| m.columns.iter())
        .filter_map(|column| {
            let expression = non_empty(column.expression.as_ref())?;
            (expression != column.name).then(|| TransformExpression {
                job_name: job_name.to_string(),
                component_name: node.unique_name.clone(),
                input_column: non_empty(column.original_db_column_name.as_ref()),
                output_column: column.name.clone(),
                expression,
                data_type: column.data_type.clone(),
            })
        });

    let variables = node
        .mapper
        .iter()
        .flat_map(|m| m.var_tables.iter())
        .flat_map(|t| t.entries.iter())
        .filter_map(|entry| {
            let expression = non_empty(entry.expression.as_ref())?;
            (expression != entry.name).then(|| TransformExpression {
                job_name: job_name.to_string(),
                component_name: node.unique_name.clone(),
                input_column: Some(entry.name.clone()),
                output_column: entry.name.clone(),
                expression,
                data_type: entry.data_type.clone().unwrap_or_default(),
            })
        });

    columns.chain(variables).collect()
}
