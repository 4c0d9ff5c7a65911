// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Summarizes how evenly self-sample load is spread across processes.

use std::collections::HashMap;

use crate::tree::PerformanceTree;

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReport {
    pub process_loads: HashMap<u64, u64>,
    pub mean: f64,
    pub std_dev: f64,
    pub min: u64,
    pub max: u64,
    pub most_loaded: Option<u64>,
    pub least_loaded: Option<u64>,
    /// `(max - mean) / mean`; `0.0` means perfectly balanced or no load at all.
    pub imbalance_factor: f64,
}

/// Aggregates every node's per-process self-sample counters into one
/// per-process total, then summarizes the distribution across processes.
pub fn analyze_balance(tree: &PerformanceTree) -> BalanceReport {
    let mut process_loads: HashMap<u64, u64> = HashMap::new();
    tree.traverse_preorder(|_, node| {
        for (pid, count) in node.per_process_self() {
            *process_loads.entry(pid).or_insert(0) += count;
        }
        true
    });

    if process_loads.is_empty() {
        return BalanceReport {
            process_loads,
            mean: 0.0,
            std_dev: 0.0,
            min: 0,
            max: 0,
            most_loaded: None,
            least_loaded: None,
            imbalance_factor: 0.0,
        };
    }

    let n = process_loads.len() as f64;
    let sum: u64 = process_loads.values().sum();
    let mean = sum as f64 / n;

    let variance = process_loads.values().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let most_loaded = process_loads.iter().max_by_key(|(_, &v)| v).map(|(&pid, _)| pid);
    let least_loaded = process_loads.iter().min_by_key(|(_, &v)| v).map(|(&pid, _)| pid);
    let max = process_loads.values().copied().max().unwrap_or(0);
    let min = process_loads.values().copied().min().unwrap_or(0);

    let imbalance_factor = if mean > 0.0 { (max as f64 - mean) / mean } else { 0.0 };

    BalanceReport {
        process_loads,
        mean,
        std_dev,
        min,
        max,
        most_loaded,
        least_loaded,
        imbalance_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ConcurrencyModel, SampleCountMode, TreeBuildMode, TreeBuilder};
    use crate::tree::{CallStack, ResolvedFrame};

    fn stack() -> CallStack {
        CallStack::new(vec![ResolvedFrame::new("work", "lib", 0)])
    }

    #[test]
    fn perfectly_balanced_processes_have_imbalance_factor_zero() {
        let mut builder = TreeBuilder::new(TreeBuildMode::ContextFree, SampleCountMode::Both, ConcurrencyModel::Serial);
        builder.insert(stack(), 1, 10);
        builder.insert(stack(), 2, 10);
        let tree = builder.tree();

        let report = analyze_balance(&tree);
        assert_eq!(report.mean, 10.0);
        assert_eq!(report.std_dev, 0.0);
        assert_eq!(report.imbalance_factor, 0.0);
    }

    #[test]
    fn skewed_load_has_imbalance_factor_above_one() {
        let mut builder = TreeBuilder::new(TreeBuildMode::ContextFree, SampleCountMode::Both, ConcurrencyModel::Serial);
        builder.insert(stack(), 1, 90);
        builder.insert(stack(), 2, 10);
        let tree = builder.tree();

        let report = analyze_balance(&tree);
        assert_eq!(report.most_loaded, Some(1));
        assert_eq!(report.least_loaded, Some(2));
        assert!(report.imbalance_factor > 0.0);
    }

    #[test]
    fn empty_tree_has_no_load() {
        let builder = TreeBuilder::new(TreeBuildMode::ContextFree, SampleCountMode::Both, ConcurrencyModel::Serial);
        let tree = builder.tree();
        let report = analyze_balance(&tree);
        assert!(report.process_loads.is_empty());
        assert_eq!(report.imbalance_factor, 0.0);
    }
}
