// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One merged call-context node.
//!
//! Counters are atomics so the three concurrent builder models (§4.2) can
//! update them without a node-wide lock; the child list and per-process
//! breakdown maps need real mutual exclusion because they grow, so each
//! keeps its own small [`Mutex`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Stable index into a [`crate::tree::PerformanceTree`]'s node arena.
///
/// `NodeId`s are never reused and never invalidated: the arena only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

pub(crate) type ProcessId = u64;

/// Tracks a node's children under one lock, so find-or-insert is atomic with
/// respect to sibling uniqueness (invariant I4).
#[derive(Debug, Default)]
pub(crate) struct ChildIndex {
    pub(crate) order: Vec<NodeId>,
    pub(crate) by_key: HashMap<(String, String), NodeId>,
}

#[derive(Debug)]
pub struct TreeNode {
    pub(crate) function_name: String,
    pub(crate) library_name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) depth: usize,
    pub(crate) self_samples: AtomicU64,
    pub(crate) inclusive_samples: AtomicU64,
    pub(crate) per_process_self: Mutex<HashMap<ProcessId, u64>>,
    pub(crate) per_process_inclusive: Mutex<HashMap<ProcessId, u64>>,
    pub(crate) children: Mutex<ChildIndex>,
}

impl TreeNode {
    pub(crate) fn new(
        function_name: String,
        library_name: String,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Self {
        Self {
            function_name,
            library_name,
            parent,
            depth,
            self_samples: AtomicU64::new(0),
            inclusive_samples: AtomicU64::new(0),
            per_process_self: Mutex::new(HashMap::new()),
            per_process_inclusive: Mutex::new(HashMap::new()),
            children: Mutex::new(ChildIndex::default()),
        }
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    pub fn identity(&self) -> (&str, &str) {
        (&self.function_name, &self.library_name)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn children(&self) -> Vec<NodeId> {
        self.children.lock().unwrap().order.clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.lock().unwrap().order.len()
    }

    pub fn self_samples(&self) -> u64 {
        self.self_samples.load(Ordering::Relaxed)
    }

    pub fn inclusive_samples(&self) -> u64 {
        self.inclusive_samples.load(Ordering::Relaxed)
    }

    pub fn per_process_self(&self) -> HashMap<ProcessId, u64> {
        self.per_process_self.lock().unwrap().clone()
    }

    pub fn per_process_inclusive(&self) -> HashMap<ProcessId, u64> {
        self.per_process_inclusive.lock().unwrap().clone()
    }

    /// `self_samples(pid) * time_per_sample_us`, per §3.
    pub fn execution_time_microseconds(&self, pid: ProcessId, time_per_sample_us: f64) -> f64 {
        let count = *self.per_process_self.lock().unwrap().get(&pid).unwrap_or(&0);
        count as f64 * time_per_sample_us
    }

    pub(crate) fn add_self(&self, pid: ProcessId, count: u64) {
        self.self_samples.fetch_add(count, Ordering::Relaxed);
        *self.per_process_self.lock().unwrap().entry(pid).or_insert(0) += count;
    }

    pub(crate) fn add_inclusive(&self, pid: ProcessId, count: u64) {
        self.inclusive_samples.fetch_add(count, Ordering::Relaxed);
        *self
            .per_process_inclusive
            .lock()
            .unwrap()
            .entry(pid)
            .or_insert(0) += count;
    }
}
