// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bulk node storage used while a tree is under construction.
//!
//! The arena only ever grows: nodes are never removed or moved once
//! allocated, which is what gives every [`NodeId`] its pointer-stability
//! guarantee (§5, "Memory").

use std::sync::Mutex;

use super::node::{NodeId, TreeNode};

pub(crate) struct NodeArena {
    nodes: Mutex<Vec<Box<TreeNode>>>,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn alloc(&self, node: TreeNode) -> NodeId {
        let mut guard = self.nodes.lock().unwrap();
        let id = NodeId(guard.len());
        guard.push(Box::new(node));
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }

    /// Borrow a node for the arena's own lifetime.
    ///
    /// SAFETY: entries are heap-allocated (`Box`) and the backing `Vec` only
    /// ever grows via `push` — existing entries are never moved, reallocated
    /// in place, or dropped while the arena lives. The lock is only needed to
    /// synchronize the (rare) growth of the outer `Vec`; once an entry
    /// exists its address is stable for the arena's lifetime, so extending
    /// the borrow past the guard is sound.
    pub(crate) fn get(&self, id: NodeId) -> &TreeNode {
        let guard = self.nodes.lock().unwrap();
        let node_ref: &TreeNode = &guard[id.0];
        unsafe { &*(node_ref as *const TreeNode) }
    }

    /// Consume the arena, handing ownership of its nodes to the finished tree.
    pub(crate) fn into_nodes(self) -> Vec<Box<TreeNode>> {
        self.nodes.into_inner().unwrap()
    }
}
