// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pre-built [`GraphNode`](crate::graph::GraphNode) implementations (§2
//! "Analysis nodes"): a source node that loads a performance tree, one node
//! per read-only analysis in [`crate::analysis`], and two general-purpose
//! escape hatches (`Transform`, `Custom`) for callers who need a node this
//! module doesn't provide.

mod balance;
mod custom;
mod filter;
mod hotspot;
mod load;
mod merge;
mod transform;
mod traversal;

pub use balance::BalanceAnalysisNode;
pub use custom::CustomNode;
pub use filter::FilterNode;
pub use hotspot::{HotspotAnalysisNode, HotspotRanking};
pub use load::LoadTreeNode;
pub use merge::MergeNode;
pub use transform::TransformNode;
pub use traversal::{TraversalNode, TraversalOrder};

use std::collections::HashMap;

use crate::errors::ExecutionError;
use crate::graph::NodeValue;
use crate::tree::PerformanceTree;

/// Type tag shared by every port that carries a [`PerformanceTree`].
pub const TREE_TYPE_TAG: &str = "performance_tree";

/// Pulls the tree out of `port`, translating a missing or mistyped input
/// into the same [`ExecutionError`] shape every analysis node surfaces.
pub(crate) fn tree_input<'a>(
    inputs: &'a HashMap<String, NodeValue>,
    port: &str,
    node_type: &str,
) -> Result<&'a PerformanceTree, ExecutionError> {
    inputs
        .get(port)
        .and_then(|v| v.downcast_ref::<PerformanceTree>())
        .ok_or_else(|| ExecutionError::NodeExecutionError {
            node: node_type.to_string(),
            cause: format!("missing or mistyped input port '{port}'"),
        })
}
