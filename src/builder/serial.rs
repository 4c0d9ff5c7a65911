// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Single-threaded reference insertion (§4.1, §4.2.1).
//!
//! No synchronization is needed here — there is only ever one caller — but
//! nodes still carry atomics and mutexes because the same [`TreeNode`] type
//! is shared with the concurrent models. Serial is the ground truth every
//! other model is checked against (P6).

use std::collections::HashMap;

use crate::tree::{CallStack, NodeArena, NodeId, ResolvedFrame, TreeNode};

use super::{ProcessId, SampleCountMode, TreeBuildMode};

/// Inserts one call-stack observation into `arena`, returning the terminal node.
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
                existing
            } else {
                let id = find_or_create_child(arena, current, frame);
                folded.insert(key, id);
                id
            }
        } else {
            find_or_create_child(arena, current, frame)
        };

        if count_mode != SampleCountMode::Exclusive {
            arena.get(target).add_inclusive(pid, self_count);
        }
        current = target;
    }

    if count_mode != SampleCountMode::Inclusive {
        arena.get(current).add_self(pid, self_count);
    }

    current
}

/// Finds `parent`'s child matching `frame`'s identity, creating it if absent.
pub(crate) fn find_or_create_child(
    arena: &NodeArena,
    parent_id: NodeId,
    frame: &ResolvedFrame,
) -> NodeId {
    let parent = arena.get(parent_id);
    let key = (frame.function_name.clone(), frame.library_name.clone());

    let mut index = parent.children.lock().unwrap();
    if let Some(&existing) = index.by_key.get(&key) {
        return existing;
    }

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
