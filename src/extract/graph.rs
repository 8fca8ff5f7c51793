//! Per-job component dependency graph

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::models::graph::{DependencyGraph, FlowEdge, GraphComponent, GraphEdge};
use crate::models::job::{ComponentNode, JobDocument};

/// Kind of a `CONNECTION` cell without an `elementRef`
pub const DEFAULT_EDGE_KIND: &str = "CONNECTION_TYPE";

/// Edge kinds that carry rows from one component to the next
const DATA_FLOW_KINDS: &[&str] = &["FLOW", "FLOW_MAIN", "FLOW_MERGE", "FLOW_REF"];

/// Incrementally built graph; nodes are registered in document order.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: DependencyGraph,
    registration_order: Vec<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component and the edges declared in its `CONNECTION`
    /// table parameters. Registering a name again resets its entry.
    pub fn register(&mut self, node: &ComponentNode) {
        let name = node.unique_name.clone();
        let mut component = GraphComponent {
            component_type: node.component_type.clone(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            position: node.position,
        };

        for cell in node
            .table_parameters("CONNECTION")
            .flat_map(|param| param.values.iter())
        {
            if cell.value.is_empty() || cell.value == name {
                continue;
            }
            let kind = cell
                .element_ref
                .clone()
                .unwrap_or_else(|| DEFAULT_EDGE_KIND.to_string());
            if kind == "FLOW" || kind == "FLOW_MAIN" {
                component.outputs.push(cell.value.clone());
            }
            self.graph.connections.push(GraphEdge {
                from: name.clone(),
                to: cell.value.clone(),
                kind,
            });
        }

        if !self.registration_order.contains(&name) {
            self.registration_order.push(name.clone());
        }
        self.graph.components.insert(name, component);
    }

    /// Record root-level connections and compute the execution order.
    pub fn finish(mut self, job: &JobDocument) -> DependencyGraph {
        for conn in &job.connections {
            let (Some(from), Some(to)) = (conn.source.as_deref(), conn.target.as_deref()) else {
                continue;
            };
            let kind = conn.connector_name.clone().unwrap_or_default();
            if DATA_FLOW_KINDS.contains(&kind.as_str()) {
                if let Some(source) = self.graph.components.get_mut(from) {
                    source.outputs.push(to.to_string());
                }
                if let Some(target) = self.graph.components.get_mut(to) {
                    target.inputs.push(from.to_string());
                }
            }
            self.graph.flows.push(FlowEdge {
                from: from.to_string(),
                to: to.to_string(),
                kind,
                label: conn.label.clone().unwrap_or_default(),
            });
        }

        self.graph.execution_order = self.execution_order(&job.name);
        self.graph
    }

    /// Topological order over parameter edges and flows; registration order
    /// when the graph has a cycle.
    fn execution_order(&self, job_name: &str) -> Vec<String> {
        let mut graph = DiGraph::<&str, ()>::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();
        for name in &self.registration_order {
            indices.insert(name.as_str(), graph.add_node(name.as_str()));
        }

        let edges = self
            .graph
            .connections
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .chain(
                self.graph
                    .flows
                    .iter()
                    .map(|f| (f.from.as_str(), f.to.as_str())),
            );
        for (from, to) in edges {
            if let (Some(&a), Some(&b)) = (indices.get(from), indices.get(to)) {
                graph.add_edge(a, b, ());
            }
        }

        match toposort(&graph, None) {
            Ok(order) => order.into_iter().map(|idx| graph[idx].to_string()).collect(),
            Err(cycle) => {
                debug!(
                    "Job {}: dependency cycle through {}, using document order",
                    job_name,
                    graph[cycle.node_id()]
                );
                self.registration_order.clone()
            }
        }
    }
}

/// Build the dependency graph of a whole job.
pub fn build_graph(job: &JobDocument) -> DependencyGraph {
    let mut builder = GraphBuilder::new();
    for node in &job.nodes {
        builder.register(node);
    }
    builder.finish(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{Connection, ElementParameter, ElementValue, Position};

    fn node(component_type: &str, name: &str) -> ComponentNode {
        ComponentNode {
            component_type: component_type.to_string(),
            unique_name: name.to_string(),
            ..Default::default()
        }
    }

    fn flow(from: &str, to: &str, kind: &str) -> Connection {
        Connection {
            source: Some(from.to_string()),
            target: Some(to.to_string()),
            label: Some("row1".to_string()),
            connector_name: Some(kind.to_string()),
        }
    }

    #[test]
    fn test_flows_define_execution_order() {
        let mut job = JobDocument::new("job");
        job.nodes = vec![
            node("tDBOutput", "out"),
            node("tMap", "map"),
            node("tDBInput", "in"),
        ];
        job.nodes[2].position = Position { x: 64, y: 128 };
        job.connections = vec![
            flow("in", "map", "FLOW_MAIN"),
            flow("map", "out", "FLOW"),
            flow("in", "out", "SUBJOB_OK"),
        ];

        let graph = build_graph(&job);
        assert_eq!(graph.execution_order, vec!["in", "map", "out"]);
        assert_eq!(graph.components["map"].inputs, vec!["in"]);
        assert_eq!(graph.components["in"].outputs, vec!["map"]);
        assert!(graph.components["out"].outputs.is_empty());
        assert_eq!(graph.components["in"].position.y, 128);
        assert_eq!(graph.flows.len(), 3);
        assert_eq!(graph.flows[2].kind, "SUBJOB_OK");
    }

    #[test]
    fn test_connection_parameter_edges() {
        let mut lookup = node("tDBInput", "lookup");
        lookup.parameters.push(ElementParameter {
            name: "CONNECTION".to_string(),
            field: Some("TABLE".to_string()),
            value: String::new(),
            values: vec![
                ElementValue {
                    element_ref: None,
                    value: "conn".to_string(),
                },
                ElementValue {
                    element_ref: Some("FLOW".to_string()),
                    value: "lookup".to_string(),
                },
                ElementValue {
                    element_ref: Some("FLOW_MAIN".to_string()),
                    value: "target".to_string(),
                },
            ],
        });
        let mut job = JobDocument::new("job");
        job.nodes = vec![lookup, node("tDBConnection", "conn")];

        let graph = build_graph(&job);
        assert_eq!(
            graph.connections,
            vec![
                GraphEdge {
                    from: "lookup".to_string(),
                    to: "conn".to_string(),
                    kind: DEFAULT_EDGE_KIND.to_string(),
                },
                GraphEdge {
                    from: "lookup".to_string(),
                    to: "target".to_string(),
                    kind: "FLOW_MAIN".to_string(),
                },
            ]
        );
        assert_eq!(graph.components["lookup"].outputs, vec!["target"]);
        assert_eq!(graph.execution_order, vec!["lookup", "conn"]);
    }

    #[test]
    fn test_cycle_falls_back_to_document_order() {
        let mut job = JobDocument::new("job");
        job.nodes = vec![node("tMap", "b"), node("tMap", "a")];
        job.connections = vec![flow("a", "b", "FLOW"), flow("b", "a", "FLOW")];

        assert_eq!(build_graph(&job).execution_order, vec!["b", "a"]);
    }

    #[test]
    fn test_empty_job() {
        assert!(build_graph(&JobDocument::new("job")).is_empty());
    }
}
