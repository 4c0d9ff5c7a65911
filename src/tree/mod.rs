// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The performance call tree: frames, nodes, and the tree that owns them.

mod arena;
mod frame;
mod node;
#[allow(clippy::module_inception)]
mod tree;

pub use frame::{CallStack, ResolvedFrame, UNKNOWN_SYMBOL};
pub use node::{NodeId, TreeNode};
pub use tree::{PerformanceTree, ROOT_FUNCTION_NAME};

pub(crate) use arena::NodeArena;
