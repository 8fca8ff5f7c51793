//! Transform document exporter

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::corpus::Corpus;

/// One expression as listed in the transform document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformListing {
    pub component: String,
    /// `"<output column> = <expression>"`
    pub expression: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Every transform expression of the corpus, grouped by job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformDocument {
    pub total_transformations: usize,
    pub by_job: BTreeMap<String, Vec<TransformListing>>,
}

impl TransformDocument {
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let mut by_job: BTreeMap<String, Vec<TransformListing>> = BTreeMap::new();
        for transform in &corpus.transforms {
            by_job
                .entry(transform.job_name.clone())
                .or_default()
                .push(TransformListing {
                    component: transform.component_name.clone(),
                    expression: format!("{} = {}", transform.output_column, transform.expression),
                    data_type: transform.data_type.clone(),
                });
        }
        Self {
            total_transformations: corpus.transforms.len(),
            by_job,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transform::TransformExpression;

    #[test]
    fn test_grouped_by_job_with_output_column() {
        let corpus = Corpus {
            transforms: vec![TransformExpression {
                job_name: "Load".to_string(),
                component_name: "tMap_1".to_string(),
                input_column: Some("cust".to_string()),
                output_column: "customer".to_string(),
                expression: "row1.cust.trim()".to_string(),
                data_type: "id_String".to_string(),
            }],
            ..Default::default()
        };
        let doc = TransformDocument::from_corpus(&corpus);
        assert_eq!(doc.total_transformations, 1);
        assert_eq!(doc.by_job["Load"][0].expression, "customer = row1.cust.trim()");
    }
}
