//! Field-mapping (tMap) model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One mapped field or intermediate variable of a tMap component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformExpression {
    pub job_name: String,
    pub component_name: String,
    pub input_column: Option<String>,
    pub output_column: String,
    pub expression: String,
    pub data_type: String,
}

impl TransformExpression {
    /// `"<input or output column> = <expression>"`
    pub fn mapping(&self) -> String {
        let column = self
            .input_column
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.output_column);
        format!("{} = {}", column, self.expression)
    }
}

/// Reconstructed mapping structure of one tMap component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformStructure {
    /// Input flows keyed by flow name
    pub input_schemas: BTreeMap<String, Vec<InputField>>,
    /// Output tables keyed by table name
    pub output_schemas: BTreeMap<String, Vec<OutputField>>,
    pub filters: Vec<TransformFilter>,
    pub lookups: Vec<LookupDescriptor>,
    pub variables: Vec<TransformVariable>,
    pub reject_flows: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputField {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub expression: String,
}

/// Filter expression of a mapper, scoped to its input or an output table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformFilter {
    InputFilter { expression: String },
    OutputFilter { table: String, expression: String },
}

/// Lookup join of a mapper input table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupDescriptor {
    pub table: String,
    /// `UNIQUE_MATCH`, `FIRST_MATCH`, `ALL_MATCHES`, ...
    pub matching_mode: String,
    /// `LOAD_ONCE`, `RELOAD`, `CACHE_OR_RELOAD`, ...
    pub lookup_mode: String,
    pub inner_join: bool,
    pub persistent: bool,
    /// Evaluation order (`sequenceOrder`, or the table's position when unset)
    pub priority: u32,
    pub cache_size: Option<String>,
    pub preload: bool,
    /// Join keys with their null handling
    pub join_keys: BTreeMap<String, JoinKeyCondition>,
    pub expression_filter: Option<String>,
    /// Expression used when the lookup finds no match
    pub fallback_expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinKeyCondition {
    pub value: String,
    pub null_handling: String,
}

/// Named intermediate variable of a mapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformVariable {
    pub name: String,
    pub expression: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// A transform expression as it appears in the aggregate document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationEntry {
    pub job: String,
    pub component: String,
    pub mapping: String,
    #[serde(rename = "type")]
    pub data_type: String,
    /// Cast template with a `{column}` placeholder
    pub safe_cast: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_prefers_input_column() {
        let mut expr = TransformExpression {
            job_name: "job".into(),
            component_name: "tMap_1".into(),
            input_column: Some("cust_id".into()),
            output_column: "customer_id".into(),
            expression: "row1.cust_id".into(),
            data_type: "id_Integer".into(),
        };
        assert_eq!(expr.mapping(), "cust_id = row1.cust_id");
        expr.input_column = None;
        assert_eq!(expr.mapping(), "customer_id = row1.cust_id");
    }
}
