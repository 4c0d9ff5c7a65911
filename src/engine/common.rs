// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared per-node execution steps used by every [`crate::engine`] strategy:
//! resolving a node's inputs from already-produced results, and driving one
//! node through Ready -> Running -> {Completed, Failed}.

use std::collections::HashMap;
use std::time::Instant;

use crate::errors::ExecutionError;
use crate::graph::{DataflowGraph, NodeState, NodeValue};
use crate::observability::messages::engine::{NodeCompleted, NodeFailed};

pub(crate) type NodeResults = HashMap<String, HashMap<String, NodeValue>>;

pub(crate) fn gather_inputs(
    graph: &DataflowGraph,
    node_name: &str,
    results: &NodeResults,
) -> Result<HashMap<String, NodeValue>, ExecutionError> {
    let mut inputs = HashMap::new();
    for edge in graph.incoming_edges(node_name) {
        let source_outputs = results
            .get(&edge.source_node)
            .ok_or_else(|| ExecutionError::MissingResult(edge.source_node.clone()))?;
        let value = source_outputs.get(&edge.source_port).ok_or_else(|| {
            ExecutionError::MissingResult(format!("{}.{}", edge.source_node, edge.source_port))
        })?;
        inputs.insert(edge.target_port.clone(), value.clone());
    }
    Ok(inputs)
}

fn transition(graph: &DataflowGraph, node_name: &str, to: NodeState) -> Result<(), ExecutionError> {
    graph
        .transition(node_name, to)
        .map(|_| ())
        .map_err(|e| ExecutionError::Internal(e.to_string()))
}

/// Resolves `node_name`'s inputs from `results` and runs it to completion,
/// driving its lifecycle state through the transition as it goes.
pub(crate) fn run_node(
    graph: &DataflowGraph,
    node_name: &str,
    results: &NodeResults,
) -> Result<HashMap<String, NodeValue>, ExecutionError> {
    let node = graph
        .node(node_name)
        .ok_or_else(|| ExecutionError::Internal(format!("node '{node_name}' vanished mid-execution")))?;
    let inputs = gather_inputs(graph, node_name, results)?;

    transition(graph, node_name, NodeState::Ready)?;
    transition(graph, node_name, NodeState::Running)?;

    let started = Instant::now();
    match node.execute(&inputs) {
        Ok(outputs) => {
            transition(graph, node_name, NodeState::Completed)?;
            tracing::debug!("{}", NodeCompleted { node: node_name, elapsed: started.elapsed() });
            Ok(outputs)
        }
        Err(err) => {
            let _ = graph.transition(node_name, NodeState::Failed);
            let cause = err.to_string();
            tracing::warn!("{}", NodeFailed { node: node_name, cause: &cause });
            Err(ExecutionError::NodeExecutionError {
                node: node_name.to_string(),
                cause,
            })
        }
    }
}
