// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Executors that run a [`crate::graph::DataflowGraph`] to completion (§4.5).
//!
//! [`SequentialExecutor`] is the reference strategy; [`ParallelExecutor`]
//! runs each topological level concurrently; [`CachingExecutor`] memoizes
//! per-node results across runs of the same graph shape.

mod caching;
mod common;
mod parallel;
mod sequential;

pub use caching::CachingExecutor;
pub use parallel::ParallelExecutor;
pub use sequential::SequentialExecutor;
