// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wraps [`analyze_balance`] as a dataflow node.

use std::collections::HashMap;

use crate::analysis::analyze_balance;
use crate::errors::ExecutionError;
use crate::graph::{GraphNode, NodeValue, PortSpec};

use super::{tree_input, TREE_TYPE_TAG};

/// Summarizes per-process self-sample load (§4.3 "Balance Analyzer").
pub struct BalanceAnalysisNode {
    input_ports: Vec<PortSpec>,
    output_ports: Vec<PortSpec>,
}

impl BalanceAnalysisNode {
    pub fn new() -> Self {
        Self {
            input_ports: vec![PortSpec::new("tree", TREE_TYPE_TAG)],
            output_ports: vec![PortSpec::new("balance_report", "balance_report")],
        }
    }
}

impl Default for BalanceAnalysisNode {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphNode for BalanceAnalysisNode {
    fn type_name(&self) -> &str {
        "balance_analysis"
    }

    fn input_ports(&self) -> &[PortSpec] {
        &self.input_ports
    }

    fn output_ports(&self) -> &[PortSpec] {
        &self.output_ports
    }

    fn execute(&self, inputs: &HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecutionError> {
        let tree = tree_input(inputs, "tree", self.type_name())?;
        let report = analyze_balance(tree);

        let fingerprint = inputs.get("tree").map(NodeValue::fingerprint).unwrap_or_default().to_string();
        let mut outputs = HashMap::new();
        outputs.insert("balance_report".to_string(), NodeValue::new("balance_report", fingerprint, report));
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::BalanceReport;
    use crate::builder::{ConcurrencyModel, SampleCountMode, TreeBuildMode, TreeBuilder};
    use crate::tree::{CallStack, ResolvedFrame};

    #[test]
    fn reports_the_heavier_process_as_most_loaded() {
        let mut builder = TreeBuilder::new(TreeBuildMode::ContextFree, SampleCountMode::Both, ConcurrencyModel::Serial);
        builder.insert(CallStack::new(vec![ResolvedFrame::new("work", "lib", 0)]), 0, 90);
        builder.insert(CallStack::new(vec![ResolvedFrame::new("work", "lib", 0)]), 1, 10);
        let tree = builder.tree();

        let mut inputs = HashMap::new();
        inputs.insert("tree".to_string(), NodeValue::new(TREE_TYPE_TAG, "t1", tree));

        let node = BalanceAnalysisNode::new();
        let outputs = node.execute(&inputs).unwrap();
        let report: &BalanceReport = outputs.get("balance_report").unwrap().downcast_ref().unwrap();
        assert_eq!(report.most_loaded, Some(0));
    }
}
