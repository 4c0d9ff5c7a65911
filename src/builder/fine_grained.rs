// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fine-grained locking model (§4.2.2).
//!
//! Each node owns its own child-index mutex. A thread walking a stack holds
//! the *current* node's lock across both the find-or-insert of the next
//! child and the counter update on that child, then releases it before
//! descending. Two threads inserting under different parents never contend.

use std::collections::HashMap;

use crate::tree::{CallStack, NodeArena, NodeId, ResolvedFrame, TreeNode};

use super::{ProcessId, SampleCountMode, TreeBuildMode};

pub(crate) fn insert_stack(
    arena: &NodeArena,
    root: NodeId,
    stack: &CallStack,
    pid: ProcessId,
    self_count: u64,
    mode: TreeBuildMode,
    count_mode: SampleCountMode,
) -> NodeId {
    let mut current = root;
    let mut folded: HashMap<(String, String), NodeId> = HashMap::new();

    for frame in stack.outermost_to_innermost() {
        let key = (frame.function_name.clone(), frame.library_name.clone());

        let target = if mode == TreeBuildMode::ContextFree {
            if let Some(&existing) = folded.get(&key) {
                if count_mode != SampleCountMode::Exclusive {
                    arena.get(existing).add_inclusive(pid, self_count);
                }
                existing
            } else {
                let id = find_or_insert_and_count(arena, current, frame, pid, self_count, count_mode);
                folded.insert(key, id);
                id
            }
        } else {
            find_or_insert_and_count(arena, current, frame, pid, self_count, count_mode)
        };

        current = target;
    }

    if count_mode != SampleCountMode::Inclusive {
        arena.get(current).add_self(pid, self_count);
    }

    current
}

/// Holds the parent's child-index lock across find-or-insert and the child's
/// counter update, matching §4.2.2's critical-section description.
fn find_or_insert_and_count(
    arena: &NodeArena,
    parent_id: NodeId,
    frame: &ResolvedFrame,
    pid: ProcessId,
    self_count: u64,
    count_mode: SampleCountMode,
) -> NodeId {
    let parent = arena.get(parent_id);
    let key = (frame.function_name.clone(), frame.library_name.clone());

    let mut index = parent.children.lock().unwrap();
    let id = match index.by_key.get(&key) {
        Some(&existing) => existing,
        None => {
            let child = TreeNode::new(
                frame.function_name.clone(),
                frame.library_name.clone(),
                Some(parent_id),
                parent.depth() + 1,
            );
            let id = arena.alloc(child);
            index.by_key.insert(key, id);
            index.order.push(id);
            id
        }
    };

    if count_mode != SampleCountMode::Exclusive {
        arena.get(id).add_inclusive(pid, self_count);
    }

    drop(index);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ResolvedFrame, ROOT_FUNCTION_NAME};

    #[test]
    fn concurrent_insertions_under_one_parent_stay_consistent() {
        let arena = NodeArena::new();
        let root = arena.alloc(TreeNode::new(ROOT_FUNCTION_NAME.to_string(), String::new(), None, 0));

        std::thread::scope(|scope| {
            for t in 0..8u64 {
                let arena = &arena;
                scope.spawn(move || {
                    for _ in 0..200 {
                        let stack = CallStack::new(vec![
                            ResolvedFrame::new("step", "lib", 0),
                            ResolvedFrame::new("work", "lib", 0),
                            ResolvedFrame::new("main", "lib", 0),
                        ]);
                        insert_stack(arena, root, &stack, t, 1, TreeBuildMode::ContextFree, SampleCountMode::Both);
                    }
                });
            }
        });

        assert_eq!(arena.len(), 4); // root, main, work, step
        let main_id = arena.get(root).children()[0];
        let work_id = arena.get(main_id).children()[0];
        let step_id = arena.get(work_id).children()[0];
        assert_eq!(arena.get(step_id).self_samples(), 1600);
        assert_eq!(arena.get(step_id).inclusive_samples(), 1600);
        assert_eq!(arena.get(work_id).inclusive_samples(), 1600);
    }
}
