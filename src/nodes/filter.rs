// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wraps [`filter_nodes`] as a dataflow node.

use std::collections::HashMap;

use crate::analysis::filter_nodes;
use crate::analysis::NodeFilter as TreeNodeFilter;
use crate::errors::ExecutionError;
use crate::graph::{GraphNode, NodeValue, PortSpec};
use crate::tree::NodeId;

use super::{tree_input, TREE_TYPE_TAG};

/// Selects node ids matching a fixed set of constraints (§4.3 "Filters & Traversals").
pub struct FilterNode {
    function_name: Option<String>,
    library_name: Option<String>,
    min_self_samples: Option<u64>,
    min_inclusive_samples: Option<u64>,
    max_depth: Option<usize>,
    input_ports: Vec<PortSpec>,
    output_ports: Vec<PortSpec>,
}

impl FilterNode {
    pub fn new() -> Self {
        Self {
            function_name: None,
            library_name: None,
            min_self_samples: None,
            min_inclusive_samples: None,
            max_depth: None,
            input_ports: vec![PortSpec::new("tree", TREE_TYPE_TAG)],
            output_ports: vec![PortSpec::new("node_ids", "node_id_list")],
        }
    }

    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    pub fn with_library_name(mut self, name: impl Into<String>) -> Self {
        self.library_name = Some(name.into());
        self
    }

    pub fn with_min_self_samples(mut self, count: u64) -> Self {
        self.min_self_samples = Some(count);
        self
    }

    pub fn with_min_inclusive_samples(mut self, count: u64) -> Self {
        self.min_inclusive_samples = Some(count);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    fn criteria(&self) -> TreeNodeFilter<'_> {
        let mut filter = TreeNodeFilter::new();
        if let Some(name) = &self.function_name {
            filter = filter.with_function_name(name);
        }
        if let Some(name) = &self.library_name {
            filter = filter.with_library_name(name);
        }
        if let Some(min) = self.min_self_samples {
            filter = filter.with_min_self_samples(min);
        }
        if let Some(min) = self.min_inclusive_samples {
            filter = filter.with_min_inclusive_samples(min);
        }
        if let Some(max) = self.max_depth {
            filter = filter.with_max_depth(max);
        }
        filter
    }
}

impl Default for FilterNode {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphNode for FilterNode {
    fn type_name(&self) -> &str {
        "filter"
    }

    fn input_ports(&self) -> &[PortSpec] {
        &self.input_ports
    }

    fn output_ports(&self) -> &[PortSpec] {
        &self.output_ports
    }

    fn execute(&self, inputs: &HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecutionError> {
        let tree = tree_input(inputs, "tree", self.type_name())?;
        let matches: Vec<NodeId> = filter_nodes(tree, &self.criteria());

        let fingerprint = format!(
            "{}:{}",
            inputs.get("tree").map(NodeValue::fingerprint).unwrap_or_default(),
            matches.len()
        );
        let mut outputs = HashMap::new();
        outputs.insert("node_ids".to_string(), NodeValue::new("node_id_list", fingerprint, matches));
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ConcurrencyModel, SampleCountMode, TreeBuildMode, TreeBuilder};
    use crate::tree::{CallStack, ResolvedFrame};

    #[test]
    fn selects_nodes_matching_the_minimum_self_samples() {
        let mut builder = TreeBuilder::new(TreeBuildMode::ContextFree, SampleCountMode::Both, ConcurrencyModel::Serial);
        builder.insert(CallStack::new(vec![ResolvedFrame::new("hot", "lib", 0)]), 0, 10);
        builder.insert(CallStack::new(vec![ResolvedFrame::new("cold", "lib", 0)]), 0, 1);
        let tree = builder.tree();

        let mut inputs = HashMap::new();
        inputs.insert("tree".to_string(), NodeValue::new(TREE_TYPE_TAG, "t1", tree));

        let node = FilterNode::new().with_min_self_samples(5);
        let outputs = node.execute(&inputs).unwrap();
        let ids: &Vec<NodeId> = outputs.get("node_ids").unwrap().downcast_ref().unwrap();
        assert_eq!(ids.len(), 1);
    }
}
