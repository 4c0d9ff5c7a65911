// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wraps the traversal collectors in [`crate::analysis`] as a dataflow node.

use std::collections::HashMap;

use crate::analysis::{level_order_ids, postorder_ids, preorder_ids};
use crate::errors::ExecutionError;
use crate::graph::{GraphNode, NodeValue, PortSpec};
use crate::tree::NodeId;

use super::{tree_input, TREE_TYPE_TAG};

/// Which order `TraversalNode` walks the tree in (§4.3 "Filters & Traversals").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    PreOrder,
    PostOrder,
    LevelOrder,
}

pub struct TraversalNode {
    order: TraversalOrder,
    input_ports: Vec<PortSpec>,
    output_ports: Vec<PortSpec>,
}

impl TraversalNode {
    pub fn new(order: TraversalOrder) -> Self {
        Self {
            order,
            input_ports: vec![PortSpec::new("tree", TREE_TYPE_TAG)],
            output_ports: vec![PortSpec::new("node_ids", "node_id_list")],
        }
    }
}

impl GraphNode for TraversalNode {
    fn type_name(&self) -> &str {
        "traversal"
    }

    fn input_ports(&self) -> &[PortSpec] {
        &self.input_ports
    }

    fn output_ports(&self) -> &[PortSpec] {
        &self.output_ports
    }

    fn execute(&self, inputs: &HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecutionError> {
        let tree = tree_input(inputs, "tree", self.type_name())?;
        let ids: Vec<NodeId> = match self.order {
            TraversalOrder::PreOrder => preorder_ids(tree),
            TraversalOrder::PostOrder => postorder_ids(tree),
            TraversalOrder::LevelOrder => level_order_ids(tree),
        };

        let fingerprint = format!(
            "{:?}:{}",
            self.order,
            inputs.get("tree").map(NodeValue::fingerprint).unwrap_or_default()
        );
        let mut outputs = HashMap::new();
        outputs.insert("node_ids".to_string(), NodeValue::new("node_id_list", fingerprint, ids));
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ConcurrencyModel, SampleCountMode, TreeBuildMode, TreeBuilder};
    use crate::tree::{CallStack, ResolvedFrame};

    #[test]
    fn preorder_visits_root_first() {
        let mut builder = TreeBuilder::new(TreeBuildMode::ContextFree, SampleCountMode::Both, ConcurrencyModel::Serial);
        builder.insert(CallStack::new(vec![ResolvedFrame::new("leaf", "lib", 0)]), 0, 1);
        let tree = builder.tree();
        let root_id = tree.root_id();

        let mut inputs = HashMap::new();
        inputs.insert("tree".to_string(), NodeValue::new(TREE_TYPE_TAG, "t1", tree));

        let node = TraversalNode::new(TraversalOrder::PreOrder);
        let outputs = node.execute(&inputs).unwrap();
        let ids: &Vec<NodeId> = outputs.get("node_ids").unwrap().downcast_ref().unwrap();
        assert_eq!(ids[0], root_id);
    }
}
