// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Read-only queries over a finished [`crate::tree::PerformanceTree`] (§4.3):
//! hotspot ranking, process-balance reporting, predicate filtering, and
//! traversal helpers.

mod balance;
mod filter;
mod hotspot;
mod traversal;

pub use balance::{analyze_balance, BalanceReport};
pub use filter::{filter_nodes, NodeFilter};
pub use hotspot::{find_hotspots, find_total_hotspots, Hotspot};
pub use traversal::{ancestors, level_order_ids, postorder_ids, preorder_ids};
