// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A single-input, single-output escape hatch for callers who need a plain
//! value transform without writing a full [`GraphNode`] implementation.

use std::collections::HashMap;

use crate::errors::ExecutionError;
use crate::graph::{GraphNode, NodeValue, PortSpec};

type TransformFn = dyn Fn(&NodeValue) -> Result<NodeValue, ExecutionError> + Send + Sync;

/// Applies `transform` to whatever arrives on its `input` port and publishes
/// the result on `output`.
pub struct TransformNode {
    type_name: String,
    transform: Box<TransformFn>,
    input_ports: Vec<PortSpec>,
    output_ports: Vec<PortSpec>,
}

impl TransformNode {
    pub fn new(
        type_name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
        transform: impl Fn(&NodeValue) -> Result<NodeValue, ExecutionError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            transform: Box::new(transform),
            input_ports: vec![PortSpec::new("input", input_type)],
            output_ports: vec![PortSpec::new("output", output_type)],
        }
    }
}

impl GraphNode for TransformNode {
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
        let input = inputs.get("input").ok_or_else(|| ExecutionError::NodeExecutionError {
            node: self.type_name.clone(),
            cause: "missing input port 'input'".to_string(),
        })?;
        let result = (self.transform)(input)?;
        let mut outputs = HashMap::new();
        outputs.insert("output".to_string(), result);
        Ok(outputs)
    }
}
