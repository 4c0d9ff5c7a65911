// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Memoizing executor (§4.5). Each node's output is keyed by a hash of its
//! implementation, instance name, and input fingerprints, so re-running an
//! unchanged graph replays cached results instead of recomputing them.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use sha2::{Digest, Sha256};

use crate::errors::ExecutionError;
use crate::graph::{DataflowGraph, GraphNode, NodeState, NodeValue};
use crate::observability::messages::engine::CacheOutcome;

use super::common::{gather_inputs, NodeResults};

/// Deterministic cache key: the node's implementation, its instance name,
/// and each connected input port's fingerprint, all sorted so key derivation
/// never depends on `HashMap` iteration order.
fn cache_key(node: &dyn GraphNode, node_name: &str, inputs: &HashMap<String, NodeValue>) -> String {
    let mut sorted_ports: Vec<&String> = inputs.keys().collect();
    sorted_ports.sort();

    let mut hasher = Sha256::new();
    hasher.update(node.type_name().as_bytes());
    hasher.update(b"|");
    hasher.update(node_name.as_bytes());
    for port in sorted_ports {
        let value = &inputs[port];
        hasher.update(b"|");
        hasher.update(port.as_bytes());
        hasher.update(b"=");
        hasher.update(value.type_tag().as_bytes());
        hasher.update(b":");
        hasher.update(value.fingerprint().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

struct LruCache {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, HashMap<String, NodeValue>>,
}

impl LruCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    fn get(&mut self, key: &str) -> Option<HashMap<String, NodeValue>> {
        let value = self.entries.get(key).cloned()?;
        self.order.retain(|k| k != key);
        self.order.push_back(key.to_string());
        Some(value)
    }

    fn put(&mut self, key: String, value: HashMap<String, NodeValue>) {
        if self.entries.contains_key(&key) {
            self.order.retain(|k| k != &key);
        } else if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.entries.remove(&evicted);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub struct CachingExecutor {
    cache: Mutex<LruCache>,
    force_recompute: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachingExecutor {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            force_recompute: false,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// When set, every node recomputes even on a cache hit, but the cache is
    /// still refreshed with the new result.
    pub fn with_force_recompute(mut self, force: bool) -> Self {
        self.force_recompute = force;
        self
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn cached_entry_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn execute(&self, graph: &DataflowGraph) -> Result<NodeResults, ExecutionError> {
        graph.validate()?;
        let order = graph.topological_sort()?;

        let mut results = NodeResults::new();
        for name in order {
            let node = graph
                .node(&name)
                .ok_or_else(|| ExecutionError::Internal(format!("node '{name}' vanished mid-execution")))?;
            let inputs = gather_inputs(graph, &name, &results)?;
            let key = cache_key(node, &name, &inputs);

            graph
                .transition(&name, NodeState::Ready)
                .map_err(|e| ExecutionError::Internal(e.to_string()))?;

            let cached = if self.force_recompute {
                None
            } else {
                self.cache.lock().unwrap().get(&key)
            };

            let outputs = match cached {
                Some(outputs) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("{}", CacheOutcome { node: &name, hit: true, key: &key });
                    graph
                        .transition(&name, NodeState::Cached)
                        .map_err(|e| ExecutionError::Internal(e.to_string()))?;
                    outputs
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("{}", CacheOutcome { node: &name, hit: false, key: &key });
                    graph
                        .transition(&name, NodeState::Running)
                        .map_err(|e| ExecutionError::Internal(e.to_string()))?;
                    let outputs = node.execute(&inputs).map_err(|err| {
                        let _ = graph.transition(&name, NodeState::Failed);
                        ExecutionError::NodeExecutionError {
                            node: name.clone(),
                            cause: err.to_string(),
                        }
                    })?;
                    graph
                        .transition(&name, NodeState::Completed)
                        .map_err(|e| ExecutionError::Internal(e.to_string()))?;
                    self.cache.lock().unwrap().put(key, outputs.clone());
                    outputs
                }
            };

            results.insert(name, outputs);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExecutionError as ExecErr;
    use crate::graph::PortSpec;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    struct CountedConstant {
        value: i64,
        calls: Arc<AtomicUsize>,
    }
    impl GraphNode for CountedConstant {
        fn type_name(&self) -> &str {
            "counted_constant"
        }
        fn input_ports(&self) -> &[PortSpec] {
            &[]
        }
        fn output_ports(&self) -> &[PortSpec] {
            static PORTS: std::sync::OnceLock<Vec<PortSpec>> = std::sync::OnceLock::new();
            PORTS.get_or_init(|| vec![PortSpec::new("value", "i64")])
        }
        fn execute(&self, _inputs: &HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecErr> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            let mut out = HashMap::new();
            out.insert("value".to_string(), NodeValue::new("i64", self.value.to_string(), self.value));
            Ok(out)
        }
    }

    #[test]
    fn second_run_hits_the_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut graph = DataflowGraph::new();
        graph.add_node(Box::new(CountedConstant { value: 7, calls: calls.clone() }));

        let executor = CachingExecutor::new(8);
        executor.execute(&graph).unwrap();
        graph.reset_all();
        executor.execute(&graph).unwrap();

        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(executor.hits(), 1);
        assert_eq!(executor.misses(), 1);
    }

    #[test]
    fn force_recompute_bypasses_the_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut graph = DataflowGraph::new();
        graph.add_node(Box::new(CountedConstant { value: 7, calls: calls.clone() }));

        let executor = CachingExecutor::new(8).with_force_recompute(true);
        executor.execute(&graph).unwrap();
        graph.reset_all();
        executor.execute(&graph).unwrap();

        assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn eviction_drops_the_least_recently_used_entry() {
        let mut cache = LruCache::new(2);
        cache.put("a".to_string(), HashMap::new());
        cache.put("b".to_string(), HashMap::new());
        cache.put("c".to_string(), HashMap::new());
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }
}
