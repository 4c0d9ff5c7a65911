// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// A sample file failed to load; ingestion continues with the remaining files.
pub struct FileLoadFailed<'a> {
    pub file: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl fmt::Display for FileLoadFailed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load sample file '{}': {}", self.file, self.error)
    }
}

/// Emitted once per `build_from_files[_parallel]` call.
pub struct BuildCompleted {
    pub files_loaded: usize,
    pub total_samples: u64,
    pub node_count: usize,
}

impl fmt::Display for BuildCompleted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tree build completed: {} files loaded, {} samples, {} nodes",
            self.files_loaded, self.total_samples, self.node_count
        )
    }
}

/// A resolver could not map an instruction address; the frame was synthesized as `<unknown>`.
pub struct ResolutionMissing<'a> {
    pub process_id: u64,
    pub instruction_address: u64,
    pub library_hint: &'a str,
}

impl fmt::Display for ResolutionMissing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not resolve pid={} addr=0x{:x} in '{}', synthesized <unknown> frame",
            self.process_id, self.instruction_address, self.library_hint
        )
    }
}
