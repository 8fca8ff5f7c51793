//! Per-job dependency graph model

use super::job::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Component dependency graph of one job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraph {
    /// Registered components keyed by unique name
    pub components: BTreeMap<String, GraphComponent>,
    /// Edges declared through `CONNECTION` table parameters
    pub connections: Vec<GraphEdge>,
    /// Root-level connections between components
    pub flows: Vec<FlowEdge>,
    /// Topological order of all components
    pub execution_order: Vec<String>,
}

impl DependencyGraph {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub position: Position,
}

/// Parameter-declared edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Connection element between two components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
}
