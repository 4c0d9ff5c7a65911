// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The fully general escape hatch: a node whose type name, ports, and
//! execution all come from the caller. `TransformNode` and `MergeNode` cover
//! the common one-in/one-out and many-in/one-out shapes; reach for this one
//! when a node needs arbitrary ports or multiple outputs.

use std::collections::HashMap;

use crate::errors::ExecutionError;
use crate::graph::{GraphNode, NodeValue, PortSpec};

type ExecuteFn = dyn Fn(&HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecutionError> + Send + Sync;

pub struct CustomNode {
    type_name: String,
    input_ports: Vec<PortSpec>,
    output_ports: Vec<PortSpec>,
    execute: Box<ExecuteFn>,
}

impl CustomNode {
    pub fn new(
        type_name: impl Into<String>,
        input_ports: Vec<PortSpec>,
        output_ports: Vec<PortSpec>,
        execute: impl Fn(&HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecutionError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            input_ports,
            output_ports,
            execute: Box::new(execute),
        }
    }
}

impl GraphNode for CustomNode {
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
        (self.execute)(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_the_supplied_closure_with_its_declared_ports() {
        let node = CustomNode::new(
            "constant_one",
            vec![],
            vec![PortSpec::new("value", "count")],
            |_inputs| {
                let mut outputs = HashMap::new();
                outputs.insert("value".to_string(), NodeValue::new("count", "1", 1i64));
                Ok(outputs)
            },
        );

        let outputs = node.execute(&HashMap::new()).unwrap();
        let value: &i64 = outputs.get("value").unwrap().downcast_ref().unwrap();
        assert_eq!(*value, 1);
    }
}
