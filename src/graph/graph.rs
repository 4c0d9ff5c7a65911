// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The dataflow graph: nodes, edges between their ports, and validation.
//!
//! [`DataflowGraph`] owns no execution logic itself (see [`crate::engine`]);
//! it only tracks topology, node lifecycle state, and the structural
//! invariants a graph must satisfy before it can be scheduled.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::{GraphError, InvalidTransition};

use super::dependency;
use super::edge::Edge;
use super::node::{checked_transition, GraphNode, NodeState};

struct NodeEntry {
    node: Box<dyn GraphNode>,
    state: Mutex<NodeState>,
}

pub struct DataflowGraph {
    nodes: HashMap<String, NodeEntry>,
    edges: Vec<Edge>,
    /// Guards auto-generated node names so concurrent callers never collide.
    id_counter: Mutex<u64>,
}

impl DataflowGraph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            id_counter: Mutex::new(0),
        }
    }

    /// Adds `node` under an auto-generated, collision-free name derived from
    /// its `type_name`, and returns that name.
    pub fn add_node(&mut self, node: Box<dyn GraphNode>) -> String {
        let id = {
            let mut counter = self.id_counter.lock().unwrap();
            let id = *counter;
            *counter += 1;
            id
        };
        let name = format!("{}_{id}", node.type_name());
        self.add_node_named(name.clone(), node);
        name
    }

    /// Adds `node` under an explicit name, replacing any node already there.
    pub fn add_node_named(&mut self, name: impl Into<String>, node: Box<dyn GraphNode>) {
        let name = name.into();
        self.edges.retain(|e| e.source_node != name && e.target_node != name);
        self.nodes.insert(
            name,
            NodeEntry {
                node,
                state: Mutex::new(NodeState::Pending),
            },
        );
    }

    /// Removes a node and every edge touching it. Returns whether it existed.
    pub fn remove_node(&mut self, name: &str) -> bool {
        self.edges.retain(|e| e.source_node != name && e.target_node != name);
        self.nodes.remove(name).is_some()
    }

    pub fn node(&self, name: &str) -> Option<&dyn GraphNode> {
        self.nodes.get(name).map(|entry| entry.node.as_ref())
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn state(&self, name: &str) -> Option<NodeState> {
        self.nodes.get(name).map(|entry| *entry.state.lock().unwrap())
    }

    pub fn transition(&self, name: &str, to: NodeState) -> Result<NodeState, InvalidTransition> {
        let entry = self.nodes.get(name).unwrap_or_else(|| {
            panic!("transition requested on unknown node '{name}'");
        });
        let mut state = entry.state.lock().unwrap();
        let next = checked_transition(*state, to)?;
        *state = next;
        Ok(next)
    }

    pub fn reset_all(&self) {
        for entry in self.nodes.values() {
            *entry.state.lock().unwrap() = NodeState::Pending;
        }
    }

    /// Connects `source_node.source_port -> target_node.target_port`,
    /// checking both ports exist, their type tags match, and the edge does
    /// not already exist.
    pub fn connect(
        &mut self,
        source_node: &str,
        source_port: &str,
        target_node: &str,
        target_port: &str,
    ) -> Result<(), GraphError> {
        let source_type = self.output_port_type(source_node, source_port)?;
        let target_type = self.input_port_type(target_node, target_port)?;

        if source_type != target_type {
            return Err(GraphError::PortTypeMismatch {
                src_node: source_node.to_string(),
                src_port: source_port.to_string(),
                src_type: source_type,
                dst_node: target_node.to_string(),
                dst_port: target_port.to_string(),
                dst_type: target_type,
            });
        }

        let edge = Edge::new(source_node, source_port, target_node, target_port);
        if self.edges.contains(&edge) {
            return Err(GraphError::DuplicateEdge {
                src_node: edge.source_node,
                src_port: edge.source_port,
                dst_node: edge.target_node,
                dst_port: edge.target_port,
            });
        }

        self.edges.push(edge);
        Ok(())
    }

    fn output_port_type(&self, node: &str, port: &str) -> Result<String, GraphError> {
        let entry = self
            .nodes
            .get(node)
            .ok_or_else(|| GraphError::UnknownNode(node.to_string()))?;
        entry
            .node
            .output_ports()
            .iter()
            .find(|p| p.name == port)
            .map(|p| p.type_name.clone())
            .ok_or_else(|| GraphError::UnknownOutputPort {
                node: node.to_string(),
                port: port.to_string(),
            })
    }

    fn input_port_type(&self, node: &str, port: &str) -> Result<String, GraphError> {
        let entry = self
            .nodes
            .get(node)
            .ok_or_else(|| GraphError::UnknownNode(node.to_string()))?;
        entry
            .node
            .input_ports()
            .iter()
            .find(|p| p.name == port)
            .map(|p| p.type_name.clone())
            .ok_or_else(|| GraphError::UnknownInputPort {
                node: node.to_string(),
                port: port.to_string(),
            })
    }

    /// `node -> [nodes whose input depends on this node's output]`, the
    /// shape [`dependency`]'s algorithms expect.
    fn forward_adjacency(&self) -> HashMap<String, Vec<String>> {
        let mut forward: HashMap<String, Vec<String>> = self.nodes.keys().map(|n| (n.clone(), Vec::new())).collect();
        for edge in &self.edges {
            forward.entry(edge.source_node.clone()).or_default().push(edge.target_node.clone());
        }
        forward
    }

    /// Every required input port is connected, every edge is well-typed
    /// (already enforced at `connect` time), and the graph is acyclic.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (name, entry) in &self.nodes {
            for port in entry.node.input_ports() {
                if !port.required {
                    continue;
                }
                let connected = self.edges.iter().any(|e| e.target_node == *name && e.target_port == port.name);
                if !connected {
                    return Err(GraphError::UnconnectedRequiredInput {
                        node: name.clone(),
                        port: port.name.clone(),
                    });
                }
            }
        }

        self.topological_sort().map(|_| ())
    }

    pub fn topological_sort(&self) -> Result<Vec<String>, GraphError> {
        dependency::topological_sort(&self.forward_adjacency())
    }

    /// Nodes grouped into levels that can each run with full internal parallelism (§4.4).
    pub fn parallel_groups(&self) -> Result<Vec<Vec<String>>, GraphError> {
        dependency::parallel_groups(&self.forward_adjacency())
    }

    /// Edges whose target is `node`, used by an executor to resolve its inputs.
    pub fn incoming_edges(&self, node: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.target_node == node).collect()
    }
}

impl Default for DataflowGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExecutionError;
    use crate::graph::value::{NodeValue, PortSpec};
    use std::collections::HashMap as Map;

    struct PassThrough {
        inputs: Vec<PortSpec>,
        outputs: Vec<PortSpec>,
    }

    impl GraphNode for PassThrough {
        fn type_name(&self) -> &str {
            "pass_through"
        }
        fn input_ports(&self) -> &[PortSpec] {
            &self.inputs
        }
        fn output_ports(&self) -> &[PortSpec] {
            &self.outputs
        }
        fn execute(&self, _inputs: &Map<String, NodeValue>) -> Result<Map<String, NodeValue>, ExecutionError> {
            Ok(Map::new())
        }
    }

    fn node(out_type: &str) -> Box<dyn GraphNode> {
        Box::new(PassThrough {
            inputs: vec![],
            outputs: vec![PortSpec::new("out", out_type)],
        })
    }

    fn consumer(in_type: &str) -> Box<dyn GraphNode> {
        Box::new(PassThrough {
            inputs: vec![PortSpec::new("in", in_type)],
            outputs: vec![],
        })
    }

    #[test]
    fn auto_named_nodes_never_collide() {
        let mut graph = DataflowGraph::new();
        let a = graph.add_node(node("tree"));
        let b = graph.add_node(node("tree"));
        assert_ne!(a, b);
    }

    #[test]
    fn connect_rejects_type_mismatch() {
        let mut graph = DataflowGraph::new();
        let src = graph.add_node(node("tree"));
        let dst = graph.add_node(consumer("hotspots"));
        let err = graph.connect(&src, "out", &dst, "in").unwrap_err();
        assert!(matches!(err, GraphError::PortTypeMismatch { .. }));
    }

    #[test]
    fn validate_catches_unconnected_required_input() {
        let mut graph = DataflowGraph::new();
        graph.add_node(consumer("tree"));
        let err = graph.validate().unwrap_err();
        assert!(matches!(err, GraphError::UnconnectedRequiredInput { .. }));
    }

    #[test]
    fn validate_detects_cycles() {
        let mut graph = DataflowGraph::new();
        let a = graph.add_node_named_for_test("a", "tree", "tree");
        let b = graph.add_node_named_for_test("b", "tree", "tree");
        graph.connect(&a, "out", &b, "in").unwrap();
        graph.connect(&b, "out", &a, "in").unwrap();
        let err = graph.validate().unwrap_err();
        assert!(matches!(err, GraphError::Cycle { .. }));
    }

    struct InOut {
        in_type: String,
        out_type: String,
    }
    impl InOut {
        fn ports_in(&self) -> Vec<PortSpec> {
            vec![PortSpec::new("in", &self.in_type)]
        }
        fn ports_out(&self) -> Vec<PortSpec> {
            vec![PortSpec::new("out", &self.out_type)]
        }
    }

    struct InOutNode {
        inputs: Vec<PortSpec>,
        outputs: Vec<PortSpec>,
    }
    impl GraphNode for InOutNode {
        fn type_name(&self) -> &str {
            "in_out"
        }
        fn input_ports(&self) -> &[PortSpec] {
            &self.inputs
        }
        fn output_ports(&self) -> &[PortSpec] {
            &self.outputs
        }
        fn execute(&self, _inputs: &Map<String, NodeValue>) -> Result<Map<String, NodeValue>, ExecutionError> {
            Ok(Map::new())
        }
    }

    impl DataflowGraph {
        fn add_node_named_for_test(&mut self, name: &str, in_type: &str, out_type: &str) -> String {
            let spec = InOut {
                in_type: in_type.to_string(),
                out_type: out_type.to_string(),
            };
            self.add_node_named(
                name,
                Box::new(InOutNode {
                    inputs: spec.ports_in(),
                    outputs: spec.ports_out(),
                }),
            );
            name.to_string()
        }
    }
}
