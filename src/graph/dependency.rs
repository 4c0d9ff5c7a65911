// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Topological ordering and level computation over a forward adjacency map
//! (`node -> [dependents]`). Kahn's algorithm drives both; a DFS pass is
//! reused only to report the offending cycle when Kahn's algorithm stalls.

use std::collections::{HashMap, VecDeque};

use crate::errors::GraphError;

/// `node_id -> number of unresolved dependencies`.
pub(crate) fn build_dependency_counts(forward: &HashMap<String, Vec<String>>) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = forward.keys().map(|k| (k.clone(), 0)).collect();
    for dependents in forward.values() {
        for dependent in dependents {
            *counts.entry(dependent.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Kahn's algorithm. Returns node ids in dependency order, earliest first.
pub(crate) fn topological_sort(forward: &HashMap<String, Vec<String>>) -> Result<Vec<String>, GraphError> {
    let mut in_degree = build_dependency_counts(forward);
    // Sorted so the result is deterministic regardless of HashMap iteration order.
    let mut initial: Vec<String> = in_degree
        .iter()
        .filter(|(_, &count)| count == 0)
        .map(|(id, _)| id.clone())
        .collect();
    initial.sort();
    let mut queue: VecDeque<String> = initial.into();

    let mut order = Vec::with_capacity(forward.len());
    while let Some(node) = queue.pop_front() {
        order.push(node.clone());
        if let Some(dependents) = forward.get(&node) {
            let mut newly_ready = Vec::new();
            for dependent in dependents {
                if let Some(count) = in_degree.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        newly_ready.push(dependent.clone());
                    }
                }
            }
            newly_ready.sort();
            queue.extend(newly_ready);
        }
    }

    if order.len() == forward.len() {
        Ok(order)
    } else {
        Err(GraphError::Cycle { path: find_cycle(forward) })
    }
}

/// Groups nodes into levels such that every node in level N depends only on
/// nodes in levels `0..N`, so a level's nodes can all run in parallel (§4.4).
pub(crate) fn parallel_groups(forward: &HashMap<String, Vec<String>>) -> Result<Vec<Vec<String>>, GraphError> {
    let mut in_degree = build_dependency_counts(forward);
    let mut levels = Vec::new();
    let mut current: Vec<String> = in_degree
        .iter()
        .filter(|(_, &count)| count == 0)
        .map(|(id, _)| id.clone())
        .collect();
    current.sort();

    let mut processed = 0usize;
    while !current.is_empty() {
        processed += current.len();
        let mut next = Vec::new();
        for node in &current {
            if let Some(dependents) = forward.get(node) {
                for dependent in dependents {
                    if let Some(count) = in_degree.get_mut(dependent) {
                        *count -= 1;
                        if *count == 0 {
                            next.push(dependent.clone());
                        }
                    }
                }
            }
        }
        levels.push(std::mem::take(&mut current));
        next.sort();
        current = next;
    }

    if processed == forward.len() {
        Ok(levels)
    } else {
        Err(GraphError::Cycle { path: find_cycle(forward) })
    }
}

/// DFS with a three-color visited set, used only after Kahn's algorithm has
/// already determined the graph is cyclic, to report one concrete cycle.
fn find_cycle(forward: &HashMap<String, Vec<String>>) -> Vec<String> {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    let mut color: HashMap<&str, Color> = forward.keys().map(|k| (k.as_str(), Color::White)).collect();
    let mut path: Vec<String> = Vec::new();

    let mut nodes: Vec<&String> = forward.keys().collect();
    nodes.sort();

    fn visit<'a>(
        node: &'a str,
        forward: &'a HashMap<String, Vec<String>>,
        color: &mut HashMap<&'a str, Color>,
        path: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        match color.get(node).copied().unwrap_or(Color::White) {
            Color::Black => return None,
            Color::Gray => {
                let start = path.iter().position(|n| n == node).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(node.to_string());
                return Some(cycle);
            }
            Color::White => {}
        }

        color.insert(node, Color::Gray);
        path.push(node.to_string());

        if let Some(dependents) = forward.get(node) {
            let mut sorted: Vec<&String> = dependents.iter().collect();
            sorted.sort();
            for dependent in &sorted {
                if let Some(cycle) = visit(dependent, forward, color, path) {
                    return Some(cycle);
                }
            }
        }

        path.pop();
        color.insert(node, Color::Black);
        None
    }

    for node in nodes {
        if let Some(cycle) = visit(node, forward, &mut color, &mut path) {
            return cycle;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> HashMap<String, Vec<String>> {
        let mut g = HashMap::new();
        g.insert("a".to_string(), vec!["b".to_string()]);
        g.insert("b".to_string(), vec!["c".to_string()]);
        g.insert("c".to_string(), vec![]);
        g
    }

    fn diamond() -> HashMap<String, Vec<String>> {
        let mut g = HashMap::new();
        g.insert("a".to_string(), vec!["b".to_string(), "c".to_string()]);
        g.insert("b".to_string(), vec!["d".to_string()]);
        g.insert("c".to_string(), vec!["d".to_string()]);
        g.insert("d".to_string(), vec![]);
        g
    }

    #[test]
    fn sorts_a_linear_chain() {
        assert_eq!(topological_sort(&chain()).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn diamond_has_two_levels_after_the_source() {
        let levels = parallel_groups(&diamond()).unwrap();
        assert_eq!(levels, vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
    }

    #[test]
    fn reports_a_concrete_cycle() {
        let mut g = HashMap::new();
        g.insert("a".to_string(), vec!["b".to_string()]);
        g.insert("b".to_string(), vec!["c".to_string()]);
        g.insert("c".to_string(), vec!["a".to_string()]);

        let err = topological_sort(&g).unwrap_err();
        match err {
            GraphError::Cycle { path } => {
                assert!(path.len() >= 2);
                assert_eq!(path.first(), path.last());
            }
            other => panic!("expected Cycle, got {other:?}"),
        }
    }
}
