//! Context-variable mapping document

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::context::ContextMappingEntry;
use crate::models::corpus::AggregateDocument;

/// Context variables with their target references, by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMappingDocument {
    pub context_variable_mappings: BTreeMap<String, ContextMappingEntry>,
}

impl ContextMappingDocument {
    pub fn from_document(document: &AggregateDocument) -> Self {
        Self {
            context_variable_mappings: document.context_mappings.clone(),
        }
    }
}
