// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The analysis-node contract and its lifecycle state machine (§4.4, §4.7).

use std::collections::HashMap;
use std::fmt;

use crate::errors::{ExecutionError, InvalidTransition};

use super::value::{NodeValue, PortSpec};

/// One node's position in the dataflow engine's execution lifecycle.
///
/// A node always starts `Pending`, becomes `Ready` once every required input
/// is connected and the graph has been scheduled, and leaves `Running` for
/// exactly one of `Completed`, `Cached`, or `Failed`. `reset` returns any
/// terminal state to `Pending` so a graph can be re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    Pending,
    Ready,
    Running,
    Completed,
    Cached,
    Failed,
}

impl NodeState {
    fn label(self) -> &'static str {
        match self {
            NodeState::Pending => "Pending",
            NodeState::Ready => "Ready",
            NodeState::Running => "Running",
            NodeState::Completed => "Completed",
            NodeState::Cached => "Cached",
            NodeState::Failed => "Failed",
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, NodeState::Completed | NodeState::Cached | NodeState::Failed)
    }

    /// Whether `self -> next` is a legal move in the node lifecycle.
    pub fn can_transition_to(self, next: NodeState) -> bool {
        use NodeState::*;
        match (self, next) {
            (Pending, Ready) => true,
            (Ready, Running) => true,
            (Running, Completed) | (Running, Failed) | (Running, Cached) => true,
            // A cache hit can short-circuit straight from Ready without running.
            (Ready, Cached) => true,
            (from, Pending) if from.is_terminal() => true,
            _ => false,
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit of work in a [`crate::graph::DataflowGraph`].
///
/// Implementations describe their ports up front so the graph can validate
/// connections before anything runs, then compute outputs from resolved
/// inputs in `execute`.
pub trait GraphNode: Send + Sync {
    /// A stable identifier for the node's implementation, used as part of
    /// the caching executor's cache key (§4.5) — not the node's instance name.
    fn type_name(&self) -> &str;

    fn input_ports(&self) -> &[PortSpec];

    fn output_ports(&self) -> &[PortSpec];

    fn execute(&self, inputs: &HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecutionError>;
}

/// Attempts `from.can_transition_to(to)`, producing an [`InvalidTransition`] on failure.
pub fn checked_transition(from: NodeState, to: NodeState) -> Result<NodeState, InvalidTransition> {
    if from.can_transition_to(to) {
        Ok(to)
    } else {
        Err(InvalidTransition {
            from: from.label(),
            attempted: to.label(),
        })
    }
}
