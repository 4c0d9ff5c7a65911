// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Convenience wrappers that collect [`PerformanceTree`]'s visitor-based
//! traversals into plain vectors, and ancestor lookups built on `parent()`.

use crate::tree::{NodeId, PerformanceTree};

pub fn preorder_ids(tree: &PerformanceTree) -> Vec<NodeId> {
    let mut out = Vec::with_capacity(tree.node_count());
    tree.traverse_preorder(|id, _| {
        out.push(id);
        true
    });
    out
}

pub fn postorder_ids(tree: &PerformanceTree) -> Vec<NodeId> {
    let mut out = Vec::with_capacity(tree.node_count());
    tree.traverse_postorder(|id, _| {
        out.push(id);
        true
    });
    out
}

pub fn level_order_ids(tree: &PerformanceTree) -> Vec<NodeId> {
    let mut out = Vec::with_capacity(tree.node_count());
    tree.traverse_level_order(|id, _| {
        out.push(id);
        true
    });
    out
}

/// `id`'s ancestors, root first, not including `id` itself.
pub fn ancestors(tree: &PerformanceTree, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut current = tree.node(id).parent();
    while let Some(parent) = current {
        out.push(parent);
        current = tree.node(parent).parent();
    }
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ConcurrencyModel, SampleCountMode, TreeBuildMode, TreeBuilder};
    use crate::tree::{CallStack, ResolvedFrame};

    #[test]
    fn preorder_visits_parent_before_children() {
        let mut builder = TreeBuilder::new(TreeBuildMode::ContextFree, SampleCountMode::Both, ConcurrencyModel::Serial);
        builder.insert(
            CallStack::new(vec![ResolvedFrame::new("leaf", "lib", 0), ResolvedFrame::new("main", "lib", 0)]),
            1,
            1,
        );
        let tree = builder.tree();

        let order = preorder_ids(&tree);
        let root_pos = order.iter().position(|&id| id == tree.root_id()).unwrap();
        let main_pos = order.iter().position(|&id| tree.node(id).function_name() == "main").unwrap();
        let leaf_pos = order.iter().position(|&id| tree.node(id).function_name() == "leaf").unwrap();
        assert!(root_pos < main_pos);
        assert!(main_pos < leaf_pos);
    }

    #[test]
    fn ancestors_are_root_first() {
        let mut builder = TreeBuilder::new(TreeBuildMode::ContextFree, SampleCountMode::Both, ConcurrencyModel::Serial);
        builder.insert(
            CallStack::new(vec![ResolvedFrame::new("leaf", "lib", 0), ResolvedFrame::new("main", "lib", 0)]),
            1,
            1,
        );
        let tree = builder.tree();

        let leaf_id = tree.find_by_name("leaf", "lib")[0];
        let chain = ancestors(&tree, leaf_id);
        assert_eq!(chain[0], tree.root_id());
        assert_eq!(tree.node(chain[1]).function_name(), "main");
    }
}
