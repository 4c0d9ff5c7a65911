// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Predicate-based node selection over a built tree.

use crate::tree::{NodeId, PerformanceTree, TreeNode};

/// A composable set of optional constraints; a node matches when it
/// satisfies every constraint that is `Some`.
#[derive(Debug, Clone, Default)]
pub struct NodeFilter<'a> {
    pub function_name: Option<&'a str>,
    pub library_name: Option<&'a str>,
    pub min_self_samples: Option<u64>,
    pub min_inclusive_samples: Option<u64>,
    pub max_depth: Option<usize>,
}

impl<'a> NodeFilter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function_name(mut self, name: &'a str) -> Self {
        self.function_name = Some(name);
        self
    }

    pub fn with_library_name(mut self, name: &'a str) -> Self {
        self.library_name = Some(name);
        self
    }

    pub fn with_min_self_samples(mut self, count: u64) -> Self {
        self.min_self_samples = Some(count);
        self
    }

    pub fn with_min_inclusive_samples(mut self, count: u64) -> Self {
        self.min_inclusive_samples = Some(count);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn matches(&self, node: &TreeNode) -> bool {
        if let Some(name) = self.function_name {
            if node.function_name() != name {
                return false;
            }
        }
        if let Some(name) = self.library_name {
            if node.library_name() != name {
                return false;
            }
        }
        if let Some(min) = self.min_self_samples {
            if node.self_samples() < min {
                return false;
            }
        }
        if let Some(min) = self.min_inclusive_samples {
            if node.inclusive_samples() < min {
                return false;
            }
        }
        if let Some(max) = self.max_depth {
            if node.depth() > max {
                return false;
            }
        }
        true
    }
}

pub fn filter_nodes(tree: &PerformanceTree, filter: &NodeFilter) -> Vec<NodeId> {
    tree.node_ids().filter(|id| filter.matches(tree.node(*id))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ConcurrencyModel, SampleCountMode, TreeBuildMode, TreeBuilder};
    use crate::tree::{CallStack, ResolvedFrame};

    #[test]
    fn filters_by_name_and_minimum_self_samples() {
        let mut builder = TreeBuilder::new(TreeBuildMode::ContextFree, SampleCountMode::Both, ConcurrencyModel::Serial);
        builder.insert(
            CallStack::new(vec![ResolvedFrame::new("hot", "lib", 0), ResolvedFrame::new("main", "lib", 0)]),
            1,
            10,
        );
        builder.insert(
            CallStack::new(vec![ResolvedFrame::new("cold", "lib", 0), ResolvedFrame::new("main", "lib", 0)]),
            1,
            1,
        );
        let tree = builder.tree();

        let filter = NodeFilter::new().with_min_self_samples(5);
        let matches = filter_nodes(&tree, &filter);
        assert_eq!(matches.len(), 1);
        assert_eq!(tree.node(matches[0]).function_name(), "hot");
    }
}
