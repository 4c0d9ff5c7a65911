// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Combines several upstream outputs into one downstream value.

use std::collections::HashMap;

use crate::errors::ExecutionError;
use crate::graph::{GraphNode, NodeValue, PortSpec};

type CombineFn = dyn Fn(&HashMap<String, NodeValue>) -> Result<NodeValue, ExecutionError> + Send + Sync;

/// Reads every port in `input_ports` and folds them into one `merged` output
/// via `combine`. Useful for joining, say, a hotspot list and a balance
/// report into a single report record.
pub struct MergeNode {
    type_name: String,
    combine: Box<CombineFn>,
    input_ports: Vec<PortSpec>,
    output_ports: Vec<PortSpec>,
}

impl MergeNode {
    pub fn new(
        type_name: impl Into<String>,
        input_ports: Vec<PortSpec>,
        output_type: impl Into<String>,
        combine: impl Fn(&HashMap<String, NodeValue>) -> Result<NodeValue, ExecutionError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            combine: Box::new(combine),
            input_ports,
            output_ports: vec![PortSpec::new("merged", output_type)],
        }
    }
}

impl GraphNode for MergeNode {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn input_ports(&self) -> &[PortSpec] {
        &self.input_ports
    }

    fn output_ports(&self) -> &[PortSpec] {
        &self.output_ports
    }

    fn execute(&self, inputs: &HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecutionError> {
        let merged = (self.combine)(inputs)?;
        let mut outputs = HashMap::new();
        outputs.insert("merged".to_string(), merged);
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combines_two_counts_into_a_sum() {
        let node = MergeNode::new(
            "sum",
            vec![PortSpec::new("a", "count"), PortSpec::new("b", "count")],
            "count",
            |inputs: &HashMap<String, NodeValue>| {
                let a: &i64 = inputs.get("a").unwrap().downcast_ref().unwrap();
                let b: &i64 = inputs.get("b").unwrap().downcast_ref().unwrap();
                Ok(NodeValue::new("count", (a + b).to_string(), a + b))
            },
        );

        let mut inputs = HashMap::new();
        inputs.insert("a".to_string(), NodeValue::new("count", "2", 2i64));
        inputs.insert("b".to_string(), NodeValue::new("count", "3", 3i64));

        let outputs = node.execute(&inputs).unwrap();
        let sum: &i64 = outputs.get("merged").unwrap().downcast_ref().unwrap();
        assert_eq!(*sum, 5);
    }
}
