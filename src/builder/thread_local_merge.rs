// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Thread-local build-then-merge model (§4.2.3).
//!
//! Each worker builds a private tree from its shard of the input with no
//! synchronization at all, then the private trees are folded together
//! pairwise in a fixed left-to-right order so the result is deterministic
//! regardless of how threads happen to finish.

use crate::tree::{CallStack, NodeArena, NodeId, TreeNode, ROOT_FUNCTION_NAME};

use super::serial;
use super::{ProcessId, SampleCountMode, TreeBuildMode};

/// One call-stack observation, owned, so it can be moved into a worker thread.
pub(crate) struct Observation {
    pub(crate) stack: CallStack,
    pub(crate) process_id: ProcessId,
    pub(crate) self_count: u64,
}

pub(crate) struct PartialTree {
    pub(crate) arena: NodeArena,
    pub(crate) root: NodeId,
}

fn new_partial() -> PartialTree {
    let arena = NodeArena::new();
    let root = arena.alloc(TreeNode::new(ROOT_FUNCTION_NAME.to_string(), String::new(), None, 0));
    PartialTree { arena, root }
}

fn build_partial(
    shard: &[Observation],
    mode: TreeBuildMode,
    count_mode: SampleCountMode,
) -> PartialTree {
    let partial = new_partial();
    for obs in shard {
        serial::insert_stack(
            &partial.arena,
            partial.root,
            &obs.stack,
            obs.process_id,
            obs.self_count,
            mode,
            count_mode,
        );
    }
    partial
}

fn find_or_create_child_named(
    arena: &NodeArena,
    parent_id: NodeId,
    function_name: &str,
    library_name: &str,
) -> NodeId {
    let parent = arena.get(parent_id);
    let key = (function_name.to_string(), library_name.to_string());

    let mut index = parent.children.lock().unwrap();
    if let Some(&existing) = index.by_key.get(&key) {
        return existing;
    }

    let child = TreeNode::new(
        function_name.to_string(),
        library_name.to_string(),
        Some(parent_id),
        parent.depth() + 1,
    );
    let id = arena.alloc(child);
    index.by_key.insert(key, id);
    index.order.push(id);
    id
}

/// Folds every counter and descendant of `src_id` (in `src_arena`) onto
/// `dest_id` (in `dest_arena`), creating matching nodes in `dest_arena` as
/// needed.
fn merge_node(dest_arena: &NodeArena, dest_id: NodeId, src_arena: &NodeArena, src_id: NodeId) {
    let src_node = src_arena.get(src_id);

    for (pid, count) in src_node.per_process_self() {
        dest_arena.get(dest_id).add_self(pid, count);
    }
    for (pid, count) in src_node.per_process_inclusive() {
        dest_arena.get(dest_id).add_inclusive(pid, count);
    }

    for child_id in src_node.children() {
        let child = src_arena.get(child_id);
        let dest_child_id = find_or_create_child_named(
            dest_arena,
            dest_id,
            child.function_name(),
            child.library_name(),
        );
        merge_node(dest_arena, dest_child_id, src_arena, child_id);
    }
}

fn merge_into(dest: &PartialTree, src: &PartialTree) {
    merge_node(&dest.arena, dest.root, &src.arena, src.root);
}

/// Splits `observations` into `num_threads` shards, builds a private tree per
/// shard in parallel, then merges them left-to-right into the first shard's
/// tree so the outcome never depends on thread scheduling order.
pub(crate) fn build_and_merge(
    observations: Vec<Observation>,
    num_threads: usize,
    mode: TreeBuildMode,
    count_mode: SampleCountMode,
) -> PartialTree {
    if observations.is_empty() {
        return new_partial();
    }

    let num_threads = num_threads.max(1).min(observations.len());
    let shard_size = observations.len().div_ceil(num_threads);
    let shards: Vec<Vec<Observation>> = observations
        .into_iter()
        .fold(Vec::new(), |mut acc, obs| {
            if acc.is_empty() || acc.last().unwrap().len() >= shard_size {
                acc.push(Vec::new());
            }
            acc.last_mut().unwrap().push(obs);
            acc
        });

    let partials: Vec<PartialTree> = std::thread::scope(|scope| {
        let handles: Vec<_> = shards
            .iter()
            .map(|shard| scope.spawn(move || build_partial(shard, mode, count_mode)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut iter = partials.into_iter();
    let accumulator = iter.next().unwrap_or_else(new_partial);
    for partial in iter {
        merge_into(&accumulator, &partial);
    }
    accumulator
}
