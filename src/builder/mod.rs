// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Builds a [`PerformanceTree`] from sample data under one of four
//! concurrency models (§4.2). All four must produce counter-equivalent
//! trees from the same input (P6); [`serial`] is the reference the others
//! are checked against.

mod fine_grained;
mod lock_free;
mod serial;
mod thread_local_merge;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::BuildError;
use crate::io::{resolve_stack, OffsetResolver, SampleReader};
use crate::observability::messages::tree::{BuildCompleted, FileLoadFailed};
use crate::tree::{CallStack, NodeArena, NodeId, PerformanceTree, TreeNode, ROOT_FUNCTION_NAME};

pub(crate) type ProcessId = u64;

/// Whether recursive self-calls fold onto a single node or stay nested (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeBuildMode {
    /// Merge by identity pair; a repeated frame within one stack reuses the
    /// node it first created instead of descending into a deeper duplicate.
    ContextFree,
    /// Merge by identity pair *and* parent chain; recursion produces nested,
    /// distinct nodes, one per depth of the recursive call.
    ContextAware,
}

/// Which counters an insertion updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCountMode {
    Exclusive,
    Inclusive,
    Both,
}

/// Which builder implementation performs node find-or-insert and counter
/// updates (§4.2). All four are counter-equivalent; they differ only in how
/// they synchronize concurrent insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyModel {
    Serial,
    FineGrainedLock,
    ThreadLocalMerge,
    LockFree,
}

/// Outcome of a `build_from_files`/`build_from_files_parallel` call: how many
/// files were attempted, how many loaded cleanly, and how many failed and
/// were skipped rather than aborting the whole build (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub files_attempted: usize,
    pub files_loaded: usize,
    pub files_failed: usize,
}

/// Accumulates call-stack observations into a [`PerformanceTree`].
pub struct TreeBuilder {
    mode: TreeBuildMode,
    count_mode: SampleCountMode,
    concurrency: ConcurrencyModel,
    num_threads: usize,
    time_per_sample_us: f64,
    reader: Option<Arc<dyn SampleReader>>,
    resolver: Option<Arc<dyn OffsetResolver>>,
    arena: NodeArena,
    root: NodeId,
    pending: Vec<thread_local_merge::Observation>,
    files_loaded: usize,
}

impl TreeBuilder {
    pub fn new(mode: TreeBuildMode, count_mode: SampleCountMode, concurrency: ConcurrencyModel) -> Self {
        let arena = NodeArena::new();
        let root = arena.alloc(TreeNode::new(ROOT_FUNCTION_NAME.to_string(), String::new(), None, 0));
        Self {
            mode,
            count_mode,
            concurrency,
            num_threads: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            time_per_sample_us: 1.0,
            reader: None,
            resolver: None,
            arena,
            root,
            pending: Vec::new(),
            files_loaded: 0,
        }
    }

    pub fn set_num_threads(&mut self, num_threads: usize) -> &mut Self {
        self.num_threads = num_threads.max(1);
        self
    }

    pub fn set_concurrency_model(&mut self, model: ConcurrencyModel) -> &mut Self {
        self.concurrency = model;
        self
    }

    pub fn set_time_per_sample_us(&mut self, time_per_sample_us: f64) -> &mut Self {
        self.time_per_sample_us = time_per_sample_us;
        self
    }

    pub fn with_sample_reader(mut self, reader: Arc<dyn SampleReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn with_offset_resolver(mut self, resolver: Arc<dyn OffsetResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Loads every library map in `paths` into the injected [`OffsetResolver`].
    pub fn load_library_maps(&mut self, paths: &[PathBuf]) -> Result<(), BuildError> {
        let resolver = self.resolver.as_ref().ok_or_else(|| {
            BuildError::InvalidArgument("no offset resolver configured".to_string())
        })?;
        for path in paths {
            resolver.load(path)?;
        }
        Ok(())
    }

    /// Records one call-stack observation, dispatching to the configured
    /// concurrency model's insertion algorithm.
    pub fn insert(&mut self, stack: CallStack, process_id: ProcessId, self_count: u64) -> &mut Self {
        match self.concurrency {
            ConcurrencyModel::Serial => {
                serial::insert_stack(&self.arena, self.root, &stack, process_id, self_count, self.mode, self.count_mode);
            }
            ConcurrencyModel::FineGrainedLock => {
                fine_grained::insert_stack(&self.arena, self.root, &stack, process_id, self_count, self.mode, self.count_mode);
            }
            ConcurrencyModel::LockFree => {
                lock_free::insert_stack(&self.arena, self.root, &stack, process_id, self_count, self.mode, self.count_mode);
            }
            ConcurrencyModel::ThreadLocalMerge => {
                self.pending.push(thread_local_merge::Observation {
                    stack,
                    process_id,
                    self_count,
                });
            }
        }
        self
    }

    /// Reads, resolves, and inserts every sample record in `files`, one file
    /// at a time, using the injected reader and resolver.
    pub fn build_from_files(&mut self, files: &[PathBuf]) -> Result<LoadSummary, BuildError> {
        let (records, failed) = self.load_records(files, false)?;
        for (pid, stack) in records {
            self.insert(stack, pid, 1);
        }
        Ok(LoadSummary {
            files_attempted: files.len(),
            files_loaded: files.len() - failed,
            files_failed: failed,
        })
    }

    /// Reads and resolves `files` concurrently (one worker thread per file,
    /// bounded by `num_threads`), then inserts every record through the
    /// configured concurrency model. Insertion order across files is not
    /// guaranteed, but P6 equivalence does not depend on insertion order.
    pub fn build_from_files_parallel(&mut self, files: &[PathBuf]) -> Result<LoadSummary, BuildError> {
        let (records, failed) = self.load_records(files, true)?;
        for (pid, stack) in records {
            self.insert(stack, pid, 1);
        }
        Ok(LoadSummary {
            files_attempted: files.len(),
            files_loaded: files.len() - failed,
            files_failed: failed,
        })
    }

    fn load_records(
        &mut self,
        files: &[PathBuf],
        parallel: bool,
    ) -> Result<(Vec<(ProcessId, CallStack)>, usize), BuildError> {
        let reader = self
            .reader
            .as_ref()
            .ok_or_else(|| BuildError::InvalidArgument("no sample reader configured".to_string()))?
            .as_ref();
        let resolver = self
            .resolver
            .as_ref()
            .ok_or_else(|| BuildError::InvalidArgument("no offset resolver configured".to_string()))?
            .as_ref();

        let load_one = |path: &Path| -> Result<Vec<(ProcessId, CallStack)>, BuildError> {
            let records = reader.read_samples(path)?;
            Ok(records
                .into_iter()
                .map(|record| {
                    let stack = resolve_stack(resolver, record.process_id, &record.call_stack);
                    (record.process_id, stack)
                })
                .collect())
        };

        let results: Vec<Result<Vec<(ProcessId, CallStack)>, BuildError>> = if parallel {
            std::thread::scope(|scope| {
                let handles: Vec<_> = files
                    .iter()
                    .map(|path| scope.spawn(|| load_one(path)))
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            })
        } else {
            files.iter().map(|path| load_one(path)).collect()
        };

        let mut loaded = Vec::new();
        let mut failures = 0usize;
        for (path, result) in files.iter().zip(results) {
            match result {
                Ok(mut records) => loaded.append(&mut records),
                Err(err) => {
                    failures += 1;
                    let file = path.to_string_lossy();
                    tracing::warn!("{}", FileLoadFailed { file: file.as_ref(), error: &err });
                }
            }
        }

        if failures == files.len() && !files.is_empty() {
            return Err(BuildError::AllFilesFailed { attempted: files.len() });
        }
        self.files_loaded += files.len() - failures;
        Ok((loaded, failures))
    }

    /// Finalizes the tree and checks invariants I1-I6 before returning it.
    pub fn try_tree(self) -> Result<PerformanceTree, BuildError> {
        let (arena, root) = match self.concurrency {
            ConcurrencyModel::ThreadLocalMerge => {
                let partial = thread_local_merge::build_and_merge(
                    self.pending,
                    self.num_threads,
                    self.mode,
                    self.count_mode,
                );
                (partial.arena, partial.root)
            }
            _ => (self.arena, self.root),
        };

        let tree = PerformanceTree::finalize(arena, root, self.time_per_sample_us, self.mode == TreeBuildMode::ContextFree);
        tree.verify_invariants()?;

        tracing::info!(
            "{}",
            BuildCompleted {
                files_loaded: self.files_loaded,
                total_samples: tree.total_samples(),
                node_count: tree.node_count(),
            }
        );

        Ok(tree)
    }

    /// Finalizes the tree, panicking if an invariant is violated.
    ///
    /// An invariant violation here means a bug in one of the insertion
    /// algorithms, not bad input, so panicking (rather than threading a
    /// `Result` through the common case) matches how the rest of this
    /// module treats internal consistency failures.
    pub fn tree(self) -> PerformanceTree {
        self.try_tree().expect("performance tree invariant violated")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ResolvedFrame;
    use std::collections::HashSet;

    fn stack(names: &[&str]) -> CallStack {
        // names given outermost-first; CallStack is stored deepest-first.
        CallStack::new(
            names
                .iter()
                .rev()
                .map(|n| ResolvedFrame::new(*n, "lib", 0))
                .collect(),
        )
    }

    #[test]
    fn context_free_folds_direct_recursion_onto_one_node() {
        let mut builder = TreeBuilder::new(
            TreeBuildMode::ContextFree,
            SampleCountMode::Both,
            ConcurrencyModel::Serial,
        );
        builder.insert(stack(&["A", "A", "A"]), 1, 1);
        let tree = builder.tree();

        assert_eq!(tree.node(tree.root_id()).child_count(), 1);
        let a = tree.node(tree.root_id()).children()[0];
        let a = tree.node(a);
        assert_eq!(a.function_name(), "A");
        assert_eq!(a.self_samples(), 1);
        assert_eq!(a.inclusive_samples(), 3);
        assert_eq!(a.child_count(), 0);
    }

    #[test]
    fn context_aware_keeps_recursion_nested() {
        let mut builder = TreeBuilder::new(
            TreeBuildMode::ContextAware,
            SampleCountMode::Both,
            ConcurrencyModel::Serial,
        );
        builder.insert(stack(&["A", "A", "A"]), 1, 1);
        let tree = builder.tree();

        let mut depth = 0;
        let mut current = tree.root_id();
        loop {
            let node = tree.node(current);
            let children = node.children();
            if children.is_empty() {
                break;
            }
            assert_eq!(children.len(), 1);
            current = children[0];
            depth += 1;
        }
        assert_eq!(depth, 3);
        assert_eq!(tree.node(current).self_samples(), 1);
        assert_eq!(tree.node(current).inclusive_samples(), 1);
    }

    fn sample_stacks() -> Vec<CallStack> {
        vec![
            stack(&["main", "parse", "tokenize"]),
            stack(&["main", "parse", "tokenize"]),
            stack(&["main", "parse", "validate"]),
            stack(&["main", "run", "tokenize"]),
            stack(&["main", "run"]),
        ]
    }

    fn build_with(model: ConcurrencyModel) -> PerformanceTree {
        let mut builder = TreeBuilder::new(TreeBuildMode::ContextFree, SampleCountMode::Both, model);
        builder.set_num_threads(4);
        for (i, s) in sample_stacks().into_iter().enumerate() {
            builder.insert(s, (i % 2) as u64, 1);
        }
        builder.tree()
    }

    /// P6: every concurrency model produces a counter-equivalent tree from
    /// identical input, modulo sibling ordering.
    #[test]
    fn all_concurrency_models_are_counter_equivalent() {
        let reference = build_with(ConcurrencyModel::Serial);
        for model in [
            ConcurrencyModel::FineGrainedLock,
            ConcurrencyModel::LockFree,
            ConcurrencyModel::ThreadLocalMerge,
        ] {
            let candidate = build_with(model);
            assert_eq!(candidate.total_samples(), reference.total_samples());
            assert_eq!(candidate.node_count(), reference.node_count());

            let ref_paths: HashSet<Vec<(String, String)>> =
                reference.node_ids().map(|id| reference.path_to(id)).collect();
            let cand_paths: HashSet<Vec<(String, String)>> =
                candidate.node_ids().map(|id| candidate.path_to(id)).collect();
            assert_eq!(cand_paths, ref_paths, "path sets differ for {model:?}");

            for id in reference.node_ids() {
                let path = reference.path_to(id);
                let cand_id = candidate
                    .node_ids()
                    .find(|cid| candidate.path_to(*cid) == path)
                    .unwrap();
                assert_eq!(
                    reference.node(id).self_samples(),
                    candidate.node(cand_id).self_samples(),
                    "self_samples differ at {path:?} for {model:?}"
                );
                assert_eq!(
                    reference.node(id).inclusive_samples(),
                    candidate.node(cand_id).inclusive_samples(),
                    "inclusive_samples differ at {path:?} for {model:?}"
                );
            }
        }
    }

    #[test]
    fn thread_local_merge_produces_a_single_merged_root() {
        let tree = build_with(ConcurrencyModel::ThreadLocalMerge);
        assert_eq!(tree.total_samples(), 5);
        tree.verify_invariants().unwrap();
    }
}
