// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Level-by-level executor (§4.4): every node in a topological level runs
//! concurrently, bounded by `max_concurrency`, before the next level starts.
//! A level's worker threads are always joined before a failure is raised, so
//! one node's error never leaves siblings mid-flight.

use std::sync::Mutex;

use crate::errors::ExecutionError;
use crate::graph::DataflowGraph;
use crate::observability::messages::engine::LevelStarted;

use super::common::{run_node, NodeResults};

pub struct ParallelExecutor {
    max_concurrency: usize,
}

impl ParallelExecutor {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn with_default_concurrency() -> Self {
        let concurrency = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        Self::new(concurrency)
    }

    pub fn execute(&self, graph: &DataflowGraph) -> Result<NodeResults, ExecutionError> {
        graph.validate()?;
        let levels = graph.parallel_groups()?;

        let results = Mutex::new(NodeResults::new());

        for (level_index, level) in levels.into_iter().enumerate() {
            tracing::info!(
                "{}",
                LevelStarted { level_index, node_count: level.len() }
            );
            for chunk in level.chunks(self.max_concurrency) {
                let snapshot = results.lock().unwrap().clone();

                let outcomes: Vec<Result<(String, std::collections::HashMap<String, crate::graph::NodeValue>), ExecutionError>> =
                    std::thread::scope(|scope| {
                        let handles: Vec<_> = chunk
                            .iter()
                            .map(|name| {
                                let snapshot = &snapshot;
                                scope.spawn(move || {
                                    run_node(graph, name, snapshot).map(|outputs| (name.clone(), outputs))
                                })
                            })
                            .collect();
                        handles.into_iter().map(|h| h.join().unwrap()).collect()
                    });

                let mut first_error = None;
                let mut guard = results.lock().unwrap();
                for outcome in outcomes {
                    match outcome {
                        Ok((name, outputs)) => {
                            guard.insert(name, outputs);
                        }
                        Err(err) if first_error.is_none() => first_error = Some(err),
                        Err(_) => {}
                    }
                }
                drop(guard);

                if let Some(err) = first_error {
                    return Err(err);
                }
            }
        }

        Ok(results.into_inner().unwrap())
    }
}
