// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Lock-free-on-the-hot-path model (§4.2.4).
//!
//! Counter updates are always atomic `fetch_add` calls made with no lock
//! held at all. A short per-parent lock is still needed for the rare case
//! of inserting a brand-new child — nothing else can make sibling-uniqueness
//! (I4) safe across threads — but it is released immediately after the
//! structural change, before any counter is touched.

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
                existing
            } else {
                let id = find_or_insert(arena, current, frame);
                folded.insert(key, id);
                id
            }
        } else {
            find_or_insert(arena, current, frame)
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

/// Locks only long enough to find-or-create the child; counters are updated
/// by the caller afterward with no lock held.
fn find_or_insert(arena: &NodeArena, parent_id: NodeId, frame: &ResolvedFrame) -> NodeId {
    let parent = arena.get(parent_id);
    let key = (frame.function_name.clone(), frame.library_name.clone());

    {
        let index = parent.children.lock().unwrap();
        if let Some(&existing) = index.by_key.get(&key) {
            return existing;
        }
    }

    // Re-check after re-acquiring: another thread may have inserted the same
    // child between our read above and taking the lock again below.
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
