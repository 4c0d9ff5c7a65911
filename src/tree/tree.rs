// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The merged, per-process-aggregated call-context tree.

use std::collections::HashMap;

use crate::errors::BuildError;

use super::arena::NodeArena;
use super::node::{NodeId, TreeNode};

pub const ROOT_FUNCTION_NAME: &str = "<root>";

/// Owns every node reachable from the root sentinel and the tree-wide
/// aggregates derived from them.
///
/// A `PerformanceTree` is produced by a [`crate::builder::TreeBuilder`] and is
/// read-only from the moment it is returned: §5 guarantees it is safe for
/// unbounded concurrent readers.
pub struct PerformanceTree {
    nodes: Vec<Box<TreeNode>>,
    root: NodeId,
    total_samples: u64,
    max_depth: usize,
    process_count: usize,
    time_per_sample_us: f64,
    folds_recursion: bool,
}

impl PerformanceTree {
    /// `folds_recursion` is the builder's context-free/context-aware choice
    /// (§4.1): under context-free folding a leaf can legitimately accumulate
    /// inclusive samples from every recursive pass through it with no
    /// children to attribute the difference to, so `verify_invariants`
    /// relaxes I2 for exactly that case.
    pub(crate) fn finalize(arena: NodeArena, root: NodeId, time_per_sample_us: f64, folds_recursion: bool) -> Self {
        let nodes = arena.into_nodes();

        let mut total_samples = 0u64;
        let mut max_depth = 0usize;
        let mut process_ids: std::collections::HashSet<u64> = std::collections::HashSet::new();

        for node in &nodes {
            total_samples += node.self_samples();
            max_depth = max_depth.max(node.depth());
            for pid in node.per_process_self().keys() {
                process_ids.insert(*pid);
            }
            for pid in node.per_process_inclusive().keys() {
                process_ids.insert(*pid);
            }
        }

        Self {
            nodes,
            root,
            total_samples,
            max_depth,
            process_count: process_ids.len(),
            time_per_sample_us,
            folds_recursion,
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn process_count(&self) -> usize {
        self.process_count
    }

    pub fn time_per_sample_us(&self) -> f64 {
        self.time_per_sample_us
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).child_count() == 0
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Every node whose `(function_name, library_name)` matches, across the whole tree.
    pub fn find_by_name(&self, function_name: &str, library_name: &str) -> Vec<NodeId> {
        self.node_ids()
            .filter(|id| {
                let n = self.node(*id);
                n.function_name() == function_name && n.library_name() == library_name
            })
            .collect()
    }

    pub fn nodes_at_depth(&self, depth: usize) -> Vec<NodeId> {
        self.node_ids().filter(|id| self.node(*id).depth() == depth).collect()
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.node_ids().filter(|id| self.is_leaf(*id)).collect()
    }

    /// Root-to-node path, used by model-equivalence tests (P6) since sibling
    /// order isn't guaranteed across concurrency models.
    pub fn path_to(&self, mut id: NodeId) -> Vec<(String, String)> {
        let mut path = Vec::new();
        loop {
            let node = self.node(id);
            path.push((node.function_name().to_string(), node.library_name().to_string()));
            match node.parent() {
                Some(parent) => id = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Depth-first, parent before children, siblings in insertion order.
    /// The visitor returns `false` to halt traversal early.
    pub fn traverse_preorder(&self, mut visitor: impl FnMut(NodeId, &TreeNode) -> bool) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if !visitor(id, node) {
                return;
            }
            let children = node.children();
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }
    }

    /// Depth-first, children before their parent.
    pub fn traverse_postorder(&self, mut visitor: impl FnMut(NodeId, &TreeNode) -> bool) {
        fn visit(
            tree: &PerformanceTree,
            id: NodeId,
            visitor: &mut dyn FnMut(NodeId, &TreeNode) -> bool,
        ) -> bool {
            let node = tree.node(id);
            for child in node.children() {
                if !visit(tree, child, visitor) {
                    return false;
                }
            }
            visitor(id, tree.node(id))
        }
        visit(self, self.root, &mut visitor);
    }

    /// Breadth-first by depth, siblings in insertion order within a level.
    pub fn traverse_level_order(&self, mut visitor: impl FnMut(NodeId, &TreeNode) -> bool) {
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(self.root);
        while let Some(id) = queue.pop_front() {
            let node = self.node(id);
            if !visitor(id, node) {
                return;
            }
            for child in node.children() {
                queue.push_back(child);
            }
        }
    }

    /// Checks invariants I1-I6 (§3). Intended for debug-mode verification at
    /// the [`crate::builder::TreeBuilder::tree`] boundary.
    pub fn verify_invariants(&self) -> Result<(), BuildError> {
        let mut summed_self = 0u64;
        let mut per_process_summed: HashMap<u64, u64> = HashMap::new();

        for id in self.node_ids() {
            let node = self.node(id);

            // I1
            if node.inclusive_samples() < node.self_samples() {
                return Err(BuildError::InvariantViolation(format!(
                    "node '{}' has inclusive_samples ({}) < self_samples ({})",
                    node.function_name(),
                    node.inclusive_samples(),
                    node.self_samples()
                )));
            }

            // I2: a context-free leaf that absorbed a folded recursive chain
            // (§4.1) has no children to attribute its extra inclusive
            // samples to, so it's exempt from strict equality as long as it
            // still accounts for at least its own self samples.
            let children = node.children();
            let children_inclusive: u64 = children.iter().map(|c| self.node(*c).inclusive_samples()).sum();
            let expected = node.self_samples() + children_inclusive;
            let folded_leaf_exempt = self.folds_recursion && children.is_empty() && node.inclusive_samples() >= expected;
            if node.inclusive_samples() != expected && !folded_leaf_exempt {
                return Err(BuildError::InvariantViolation(format!(
                    "node '{}' inclusive_samples ({}) != self_samples + sum(children inclusive) ({})",
                    node.function_name(),
                    node.inclusive_samples(),
                    expected
                )));
            }

            // I4
            let mut seen = std::collections::HashSet::new();
            for child in &children {
                let key = self.node(*child).identity();
                if !seen.insert(key) {
                    return Err(BuildError::InvariantViolation(format!(
                        "node '{}' has duplicate children with identity {:?}",
                        node.function_name(),
                        key
                    )));
                }
            }

            summed_self += node.self_samples();
            for (pid, count) in node.per_process_self() {
                *per_process_summed.entry(pid).or_insert(0) += count;
            }
        }

        // I3
        if summed_self != self.total_samples {
            return Err(BuildError::InvariantViolation(format!(
                "sum of self_samples ({}) != total_samples ({})",
                summed_self, self.total_samples
            )));
        }

        // I6: per-process self counters sum to the node's own self_samples,
        // already enforced at write time (TreeNode::add_self); here we just
        // double check process totals are internally consistent.
        for id in self.node_ids() {
            let node = self.node(id);
            let sum: u64 = node.per_process_self().values().sum();
            if sum != node.self_samples() {
                return Err(BuildError::InvariantViolation(format!(
                    "node '{}' per-process self counters sum to {} but self_samples is {}",
                    node.function_name(),
                    sum,
                    node.self_samples()
                )));
            }
        }

        Ok(())
    }
}
