// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for diagnostic logging, grouped by subsystem.
//!
//! * `tree` - builder lifecycle (file ingestion, per-model completion)
//! * `graph` - dataflow graph validation and topology
//! * `engine` - executor scheduling, caching, failures

pub mod engine;
pub mod graph;
pub mod tree;
