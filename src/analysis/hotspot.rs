// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ranks nodes by self or inclusive sample count (§4.3).

use crate::tree::{NodeId, PerformanceTree};

#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub node_id: NodeId,
    pub function_name: String,
    pub library_name: String,
    pub self_samples: u64,
    pub inclusive_samples: u64,
    pub self_percentage: f64,
    pub inclusive_percentage: f64,
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn collect_all(tree: &PerformanceTree) -> Vec<Hotspot> {
    tree.node_ids()
        .filter(|id| *id != tree.root_id())
        .map(|id| {
            let node = tree.node(id);
            Hotspot {
                node_id: id,
                function_name: node.function_name().to_string(),
                library_name: node.library_name().to_string(),
                self_samples: node.self_samples(),
                inclusive_samples: node.inclusive_samples(),
                self_percentage: percentage(node.self_samples(), tree.total_samples()),
                inclusive_percentage: percentage(node.inclusive_samples(), tree.total_samples()),
            }
        })
        .collect()
}

/// The `top_n` nodes by self-sample count, highest first. Ties break by
/// insertion order (`NodeId`) so the result is deterministic.
pub fn find_hotspots(tree: &PerformanceTree, top_n: usize) -> Vec<Hotspot> {
    let mut all = collect_all(tree);
    all.sort_by(|a, b| b.self_samples.cmp(&a.self_samples).then_with(|| a.node_id.cmp(&b.node_id)));
    all.truncate(top_n);
    all
}

/// The `top_n` nodes by inclusive-sample count, highest first. Ties break by
/// insertion order (`NodeId`).
pub fn find_total_hotspots(tree: &PerformanceTree, top_n: usize) -> Vec<Hotspot> {
    let mut all = collect_all(tree);
    all.sort_by(|a, b| b.inclusive_samples.cmp(&a.inclusive_samples).then_with(|| a.node_id.cmp(&b.node_id)));
    all.truncate(top_n);
    all
}
