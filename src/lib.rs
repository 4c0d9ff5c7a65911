// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Merges performance-sampling data from parallel executions into one
//! per-process-aggregated call tree, and expresses hotspot, balance,
//! filter, and traversal analyses over it as nodes in a dataflow graph.
//!
//! ```text
//! tree        -- frames, nodes, the finished PerformanceTree
//! io          -- SampleReader / OffsetResolver contracts (§6)
//! builder     -- TreeBuilder and its four concurrency models (§4.2)
//! analysis    -- read-only queries over a finished tree (§4.3)
//! graph       -- DataflowGraph: ports, edges, lifecycle, scheduling (§4.4)
//! engine      -- Sequential / Parallel / Caching executors (§4.5)
//! nodes       -- pre-built GraphNode implementations
//! workflow    -- fluent façade over DataflowGraph (§4.6)
//! config      -- load configuration (§6)
//! errors      -- the error taxonomy (§7)
//! observability -- structured logging for the builder and engine
//! ```

pub mod analysis;
pub mod builder;
pub mod config;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod io;
pub mod nodes;
pub mod observability;
pub mod tree;
pub mod workflow;
