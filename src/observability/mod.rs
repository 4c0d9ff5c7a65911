// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the tree builder and dataflow engine.
//!
//! Message types live under [`messages`] and follow a struct-plus-`Display`
//! pattern so call sites never interpolate strings by hand:
//!
//! ```rust
//! use perflow_core::observability::messages::tree::BuildCompleted;
//!
//! let msg = BuildCompleted { files_loaded: 4, total_samples: 40_000, node_count: 812 };
//! tracing::info!("{}", msg);
//! ```

pub mod messages;
