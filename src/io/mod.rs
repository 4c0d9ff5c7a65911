// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! External collaborator contracts (§6).
//!
//! The core never parses `*.pflw` sample files or `*.libmap` library maps
//! itself — it consumes them through [`SampleReader`] and [`OffsetResolver`]
//! implementations injected by the caller. This keeps raw decoding and
//! symbol resolution out of scope (§1) while fixing the exact shape the core
//! requires from them.

use std::path::Path;

use crate::errors::BuildError;
use crate::tree::{CallStack, ResolvedFrame};

/// One unresolved address on a sampled stack, deepest-first within its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    pub instruction_address: u64,
}

impl RawFrame {
    pub fn new(instruction_address: u64) -> Self {
        Self { instruction_address }
    }
}

/// One `(call_stack, process_id, duration)` observation decoded from a sample file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    /// Deepest-first: index 0 is the innermost frame.
    pub call_stack: Vec<RawFrame>,
    pub process_id: u64,
    pub duration_us: u64,
}

impl SampleRecord {
    pub fn new(call_stack: Vec<RawFrame>, process_id: u64, duration_us: u64) -> Self {
        Self { call_stack, process_id, duration_us }
    }
}

/// Decodes one `*.pflw` sample file into a bounded sequence of records.
///
/// Implementations own the wire format entirely; this core only relies on
/// the semantics promised in §6: stacks are deepest-first, `process_id` is
/// non-negative, and `duration_us` is non-negative.
pub trait SampleReader: Send + Sync {
    fn read_samples(&self, path: &Path) -> Result<Vec<SampleRecord>, BuildError>;
}

/// Maps raw addresses back to symbols using a `*.libmap` file.
///
/// `load` takes `&self` rather than `&mut self` so a resolver can be shared
/// (via `Arc`) across every node that reuses it once its maps are populated;
/// implementations that need mutable state manage it with interior mutability.
pub trait OffsetResolver: Send + Sync {
    /// Loads whatever library-map data it needs for later `resolve` calls.
    fn load(&self, path: &Path) -> Result<(), BuildError>;

    /// Resolves one address. `None` means the address could not be mapped;
    /// the caller synthesizes a `<unknown>` frame rather than treating this
    /// as an error (§7, `ResolutionMissing`).
    fn resolve(&self, process_id: u64, instruction_address: u64) -> Option<(String, String, u64)>;
}

/// Resolves one raw frame, falling back to `<unknown>` on a resolver miss.
pub fn resolve_frame(
    resolver: &dyn OffsetResolver,
    process_id: u64,
    frame: RawFrame,
) -> ResolvedFrame {
    match resolver.resolve(process_id, frame.instruction_address) {
        Some((function_name, library_name, offset)) => {
            ResolvedFrame::new(function_name, library_name, offset)
        }
        None => ResolvedFrame::unknown(frame.instruction_address),
    }
}

/// Resolves an entire raw stack (already deepest-first) into a [`CallStack`].
pub fn resolve_stack(
    resolver: &dyn OffsetResolver,
    process_id: u64,
    raw_stack: &[RawFrame],
) -> CallStack {
    CallStack::new(
        raw_stack
            .iter()
            .map(|f| resolve_frame(resolver, process_id, *f))
            .collect(),
    )
}

/// A resolver that always maps successfully, for tests that don't exercise
/// resolution-miss handling.
#[cfg(test)]
pub struct IdentityResolver;

#[cfg(test)]
impl OffsetResolver for IdentityResolver {
    fn load(&self, _path: &Path) -> Result<(), BuildError> {
        Ok(())
    }

    fn resolve(&self, _process_id: u64, instruction_address: u64) -> Option<(String, String, u64)> {
        Some((
            format!("fn_{instruction_address:x}"),
            "lib".to_string(),
            instruction_address,
        ))
    }
}

/// An in-memory [`SampleReader`] for tests: files are looked up by path string.
#[cfg(test)]
#[derive(Default)]
pub struct InMemorySampleReader {
    files: std::collections::HashMap<String, Vec<SampleRecord>>,
}

#[cfg(test)]
impl InMemorySampleReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, records: Vec<SampleRecord>) -> Self {
        self.files.insert(path.into(), records);
        self
    }
}

#[cfg(test)]
impl SampleReader for InMemorySampleReader {
    fn read_samples(&self, path: &Path) -> Result<Vec<SampleRecord>, BuildError> {
        let key = path.to_string_lossy().to_string();
        self.files.get(&key).cloned().ok_or_else(|| {
            BuildError::IoFailure {
                file: key,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such in-memory file"),
            }
        })
    }
}
