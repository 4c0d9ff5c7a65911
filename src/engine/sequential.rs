// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The reference executor: one node at a time, in topological order,
//! aborting on the first failure.

use crate::errors::ExecutionError;
use crate::graph::DataflowGraph;

use super::common::{run_node, NodeResults};

#[derive(Debug, Default)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, graph: &DataflowGraph) -> Result<NodeResults, ExecutionError> {
        graph.validate()?;
        let order = graph.topological_sort()?;

        let mut results = NodeResults::new();
        for name in order {
            let outputs = run_node(graph, &name, &results)?;
            results.insert(name, outputs);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExecutionError as ExecErr;
    use crate::graph::{GraphNode, NodeValue, PortSpec};
    use std::collections::HashMap;

    struct Constant(i64);
    impl GraphNode for Constant {
        fn type_name(&self) -> &str {
            "constant"
        }
        fn input_ports(&self) -> &[PortSpec] {
            &[]
        }
        fn output_ports(&self) -> &[PortSpec] {
            static PORTS: std::sync::OnceLock<Vec<PortSpec>> = std::sync::OnceLock::new();
            PORTS.get_or_init(|| vec![PortSpec::new("value", "i64")])
        }
        fn execute(&self, _inputs: &HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecErr> {
            let mut out = HashMap::new();
            out.insert("value".to_string(), NodeValue::new("i64", self.0.to_string(), self.0));
            Ok(out)
        }
    }

    struct AddOne;
    impl GraphNode for AddOne {
        fn type_name(&self) -> &str {
            "add_one"
        }
        fn input_ports(&self) -> &[PortSpec] {
            static PORTS: std::sync::OnceLock<Vec<PortSpec>> = std::sync::OnceLock::new();
            PORTS.get_or_init(|| vec![PortSpec::new("value", "i64")])
        }
        fn output_ports(&self) -> &[PortSpec] {
            static PORTS: std::sync::OnceLock<Vec<PortSpec>> = std::sync::OnceLock::new();
            PORTS.get_or_init(|| vec![PortSpec::new("value", "i64")])
        }
        fn execute(&self, inputs: &HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecErr> {
            let value = *inputs.get("value").unwrap().downcast_ref::<i64>().unwrap();
            let mut out = HashMap::new();
            out.insert("value".to_string(), NodeValue::new("i64", (value + 1).to_string(), value + 1));
            Ok(out)
        }
    }

    #[test]
    fn runs_a_small_chain_in_order() {
        let mut graph = DataflowGraph::new();
        let source = graph.add_node(Box::new(Constant(41)));
        let sink = graph.add_node(Box::new(AddOne));
        graph.connect(&source, "value", &sink, "value").unwrap();

        let results = SequentialExecutor::new().execute(&graph).unwrap();
        let out = results.get(&sink).unwrap().get("value").unwrap();
        assert_eq!(*out.downcast_ref::<i64>().unwrap(), 42);
    }

    #[test]
    fn aborts_on_a_cycle() {
        let mut graph = DataflowGraph::new();
        let a = graph.add_node(Box::new(AddOne));
        let b = graph.add_node(Box::new(AddOne));
        graph.connect(&a, "value", &b, "value").unwrap();
        graph.connect(&b, "value", &a, "value").unwrap();

        let err = SequentialExecutor::new().execute(&graph).unwrap_err();
        assert!(matches!(err, ExecutionError::Graph(_)));
    }
}
