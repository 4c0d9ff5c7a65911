// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wraps [`find_hotspots`]/[`find_total_hotspots`] as a dataflow node.

use std::collections::HashMap;

use crate::analysis::{find_hotspots, find_total_hotspots, Hotspot};
use crate::errors::ExecutionError;
use crate::graph::{GraphNode, NodeValue, PortSpec};

use super::{tree_input, TREE_TYPE_TAG};

/// Which counter `HotspotAnalysisNode` ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotRanking {
    SelfSamples,
    InclusiveSamples,
}

/// Ranks a tree's nodes by self or inclusive sample count (§4.3 "Hotspot Analyzer").
pub struct HotspotAnalysisNode {
    top_n: usize,
    ranking: HotspotRanking,
    input_ports: Vec<PortSpec>,
    output_ports: Vec<PortSpec>,
}

impl HotspotAnalysisNode {
    pub fn new(top_n: usize, ranking: HotspotRanking) -> Self {
        Self {
            top_n,
            ranking,
            input_ports: vec![PortSpec::new("tree", TREE_TYPE_TAG)],
            output_ports: vec![PortSpec::new("hotspots", "hotspot_list")],
        }
    }
}

impl GraphNode for HotspotAnalysisNode {
    fn type_name(&self) -> &str {
        "hotspot_analysis"
    }

    fn input_ports(&self) -> &[PortSpec] {
        &self.input_ports
    }

    fn output_ports(&self) -> &[PortSpec] {
        &self.output_ports
    }

    fn execute(&self, inputs: &HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecutionError> {
        let tree = tree_input(inputs, "tree", self.type_name())?;
        let hotspots: Vec<Hotspot> = match self.ranking {
            HotspotRanking::SelfSamples => find_hotspots(tree, self.top_n),
            HotspotRanking::InclusiveSamples => find_total_hotspots(tree, self.top_n),
        };

        let fingerprint = format!(
            "{:?}:{}:{}",
            self.ranking,
            self.top_n,
            inputs.get("tree").map(NodeValue::fingerprint).unwrap_or_default()
        );
        let mut outputs = HashMap::new();
        outputs.insert("hotspots".to_string(), NodeValue::new("hotspot_list", fingerprint, hotspots));
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ConcurrencyModel, SampleCountMode, TreeBuildMode, TreeBuilder};
    use crate::tree::{CallStack, ResolvedFrame};

    fn stack(names: &[&str]) -> CallStack {
        CallStack::new(names.iter().rev().map(|n| ResolvedFrame::new(*n, "lib", 0)).collect())
    }

    #[test]
    fn ranks_by_self_samples_and_tags_a_fingerprint() {
        let mut builder = TreeBuilder::new(TreeBuildMode::ContextFree, SampleCountMode::Both, ConcurrencyModel::Serial);
        builder.insert(stack(&["main", "compute", "kernel"]), 0, 2);
        builder.insert(stack(&["main", "io"]), 1, 1);
        let tree = builder.tree();

        let mut inputs = HashMap::new();
        inputs.insert("tree".to_string(), NodeValue::new(TREE_TYPE_TAG, "t1", tree));

        let node = HotspotAnalysisNode::new(2, HotspotRanking::SelfSamples);
        let outputs = node.execute(&inputs).unwrap();
        let hotspots: &Vec<Hotspot> = outputs.get("hotspots").unwrap().downcast_ref().unwrap();
        assert_eq!(hotspots[0].function_name, "kernel");
        assert_eq!(hotspots[0].self_samples, 2);
    }
}
