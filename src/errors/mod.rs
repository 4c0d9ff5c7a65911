// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error taxonomy for the performance tree and dataflow engine.
//!
//! Every public entry point returns one of the enums defined here rather than
//! a boxed `dyn Error`, so callers can match on failure category without
//! downcasting.

use std::fmt;

/// Errors raised while building a performance tree from sample data.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O failure reading '{file}': {source}")]
    IoFailure {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no sample files could be loaded (attempted {attempted}, all failed)")]
    AllFilesFailed { attempted: usize },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Errors raised while assembling or validating a [`crate::graph::DataflowGraph`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("cycle detected in dataflow graph: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("node '{node}' has no output port '{port}'")]
    UnknownOutputPort { node: String, port: String },

    #[error("node '{node}' has no input port '{port}'")]
    UnknownInputPort { node: String, port: String },

    #[error("required input port '{port}' on node '{node}' is not connected")]
    UnconnectedRequiredInput { node: String, port: String },

    #[error(
        "port type mismatch connecting {src_node}.{src_port} ({src_type}) -> {dst_node}.{dst_port} ({dst_type})"
    )]
    PortTypeMismatch {
        src_node: String,
        src_port: String,
        src_type: String,
        dst_node: String,
        dst_port: String,
        dst_type: String,
    },

    #[error("duplicate edge {src_node}.{src_port} -> {dst_node}.{dst_port}")]
    DuplicateEdge {
        src_node: String,
        src_port: String,
        dst_node: String,
        dst_port: String,
    },

    #[error("node '{0}' is not present in the graph")]
    UnknownNode(String),
}

/// Errors surfaced by an [`crate::engine::Executor`] while running a graph.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("node '{node}' failed: {cause}")]
    NodeExecutionError { node: String, cause: String },

    #[error("node '{0}' is not present in the results map")]
    MissingResult(String),

    #[error("internal scheduling error: {0}")]
    Internal(String),
}

/// Transition requested on a node in a state it cannot leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: &'static str,
    pub attempted: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "illegal node state transition: {} -> {}",
            self.from, self.attempted
        )
    }
}

impl std::error::Error for InvalidTransition {}
