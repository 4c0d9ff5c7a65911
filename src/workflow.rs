// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A fluent façade over [`DataflowGraph`] (§4.6). Each builder method
//! appends one pre-built node and auto-connects its `tree` input port to
//! the remembered anchor's `tree` output — normally the
//! [`LoadTreeNode`](crate::nodes::LoadTreeNode) added first. The façade adds
//! no semantics of its own; it only removes the boilerplate of wiring every
//! analysis node back to the tree it reads from.

use crate::errors::GraphError;
use crate::graph::{DataflowGraph, GraphNode};
use crate::nodes::{BalanceAnalysisNode, FilterNode, HotspotAnalysisNode, TraversalNode};

pub struct WorkflowBuilder {
    graph: DataflowGraph,
    anchor: Option<String>,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self { graph: DataflowGraph::new(), anchor: None }
    }

    /// Adds `node` and remembers it as the anchor every later `with_*`
    /// method auto-connects its `tree` port to.
    pub fn load(mut self, node: impl GraphNode + 'static) -> Self {
        let name = self.graph.add_node(Box::new(node));
        self.anchor = Some(name);
        self
    }

    /// Adds `node` without connecting it to anything, for escape-hatch
    /// nodes (`Transform`, `Merge`, `Custom`) whose ports this façade
    /// doesn't know how to wire. Returns the node's assigned name.
    pub fn add(&mut self, node: impl GraphNode + 'static) -> String {
        self.graph.add_node(Box::new(node))
    }

    fn add_from_anchor(&mut self, node: Box<dyn GraphNode>) -> Result<String, GraphError> {
        let name = self.graph.add_node(node);
        if let Some(anchor) = self.anchor.clone() {
            self.graph.connect(&anchor, "tree", &name, "tree")?;
        }
        Ok(name)
    }

    pub fn with_hotspot(mut self, node: HotspotAnalysisNode) -> Result<Self, GraphError> {
        self.add_from_anchor(Box::new(node))?;
        Ok(self)
    }

    pub fn with_balance(mut self, node: BalanceAnalysisNode) -> Result<Self, GraphError> {
        self.add_from_anchor(Box::new(node))?;
        Ok(self)
    }

    pub fn with_filter(mut self, node: FilterNode) -> Result<Self, GraphError> {
        self.add_from_anchor(Box::new(node))?;
        Ok(self)
    }

    pub fn with_traversal(mut self, node: TraversalNode) -> Result<Self, GraphError> {
        self.add_from_anchor(Box::new(node))?;
        Ok(self)
    }

    /// Connects two already-added nodes by name, for wiring escape-hatch
    /// nodes added via [`Self::add`].
    pub fn connect(
        &mut self,
        source_node: &str,
        source_port: &str,
        target_node: &str,
        target_port: &str,
    ) -> Result<(), GraphError> {
        self.graph.connect(source_node, source_port, target_node, target_port)
    }

    pub fn into_graph(self) -> DataflowGraph {
        self.graph
    }
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{IdentityResolver, InMemorySampleReader};
    use crate::nodes::{HotspotRanking, LoadTreeNode};
    use std::sync::Arc;

    #[test]
    fn hotspot_auto_connects_to_the_load_nodes_tree_port() {
        let reader: Arc<dyn crate::io::SampleReader> = Arc::new(InMemorySampleReader::new());
        let resolver: Arc<dyn crate::io::OffsetResolver> = Arc::new(IdentityResolver);
        let load = LoadTreeNode::new(vec![], reader, resolver);

        let builder = WorkflowBuilder::new()
            .load(load)
            .with_hotspot(HotspotAnalysisNode::new(5, HotspotRanking::SelfSamples))
            .unwrap();

        let graph = builder.into_graph();
        assert_eq!(graph.edges().len(), 1);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn add_and_connect_wire_an_escape_hatch_node_manually() {
        use crate::graph::PortSpec;
        use crate::nodes::CustomNode;

        let source = CustomNode::new("source", vec![], vec![PortSpec::new("out", "count")], |_| {
            let mut outputs = std::collections::HashMap::new();
            outputs.insert("out".to_string(), crate::graph::NodeValue::new("count", "1", 1i64));
            Ok(outputs)
        });
        let sink = CustomNode::new("sink", vec![PortSpec::new("in", "count")], vec![], |_| {
            Ok(std::collections::HashMap::new())
        });

        let mut builder = WorkflowBuilder::new();
        let source_name = builder.add(source);
        let sink_name = builder.add(sink);
        builder.connect(&source_name, "out", &sink_name, "in").unwrap();

        let graph = builder.into_graph();
        assert_eq!(graph.edges().len(), 1);
        assert!(graph.validate().is_ok());
    }
}
