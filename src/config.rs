// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Load configuration (§6): the knobs that select a [`TreeBuilder`]'s build
//! mode, counting policy, and concurrency model, loadable from a YAML file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::builder::{ConcurrencyModel, SampleCountMode, TreeBuildMode, TreeBuilder};
use crate::errors::BuildError;

/// Mirrors [`TreeBuildMode`] for serde; kept separate so the builder's own
/// enum doesn't need to carry a `serde` dependency into non-config callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    ContextFree,
    ContextAware,
}

impl From<LoadMode> for TreeBuildMode {
    fn from(mode: LoadMode) -> Self {
        match mode {
            LoadMode::ContextFree => TreeBuildMode::ContextFree,
            LoadMode::ContextAware => TreeBuildMode::ContextAware,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadCountMode {
    Exclusive,
    Inclusive,
    Both,
}

impl From<LoadCountMode> for SampleCountMode {
    fn from(mode: LoadCountMode) -> Self {
        match mode {
            LoadCountMode::Exclusive => SampleCountMode::Exclusive,
            LoadCountMode::Inclusive => SampleCountMode::Inclusive,
            LoadCountMode::Both => SampleCountMode::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadConcurrency {
    Serial,
    FineGrainedLock,
    ThreadLocalMerge,
    LockFree,
}

impl From<LoadConcurrency> for ConcurrencyModel {
    fn from(model: LoadConcurrency) -> Self {
        match model {
            LoadConcurrency::Serial => ConcurrencyModel::Serial,
            LoadConcurrency::FineGrainedLock => ConcurrencyModel::FineGrainedLock,
            LoadConcurrency::ThreadLocalMerge => ConcurrencyModel::ThreadLocalMerge,
            LoadConcurrency::LockFree => ConcurrencyModel::LockFree,
        }
    }
}

/// `num_threads: 0` means "let the builder pick hardware concurrency" (§6).
fn default_num_threads() -> usize {
    0
}

fn default_time_per_sample_us() -> f64 {
    1.0
}

/// The configuration for one [`TreeBuilder`] run.
///
/// # Example
/// ```yaml
/// mode: context_free
/// count_mode: both
/// concurrency: lock_free
/// num_threads: 8
/// time_per_sample_us: 1.0
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LoadConfig {
    pub mode: LoadMode,
    pub count_mode: LoadCountMode,
    pub concurrency: LoadConcurrency,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default = "default_time_per_sample_us")]
    pub time_per_sample_us: f64,
}

impl LoadConfig {
    /// Reads and parses a YAML load configuration from `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| BuildError::IoFailure {
            file: path.to_string_lossy().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, BuildError> {
        serde_yaml::from_str(content).map_err(|e| BuildError::InvalidArgument(e.to_string()))
    }

    /// Builds a [`TreeBuilder`] pre-configured from this load configuration.
    pub fn build_tree_builder(&self) -> TreeBuilder {
        let mut builder = TreeBuilder::new(self.mode.into(), self.count_mode.into(), self.concurrency.into());
        if self.num_threads > 0 {
            builder.set_num_threads(self.num_threads);
        }
        builder.set_time_per_sample_us(self.time_per_sample_us);
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_yaml_document() {
        let yaml = r#"
mode: context_free
count_mode: both
concurrency: lock_free
"#;
        let cfg = LoadConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.mode, LoadMode::ContextFree);
        assert_eq!(cfg.concurrency, LoadConcurrency::LockFree);
        assert_eq!(cfg.num_threads, 0);
        assert_eq!(cfg.time_per_sample_us, 1.0);
    }

    #[test]
    fn explicit_num_threads_overrides_the_default() {
        let yaml = r#"
mode: context_aware
count_mode: exclusive
concurrency: thread_local_merge
num_threads: 8
time_per_sample_us: 2.5
"#;
        let cfg = LoadConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.num_threads, 8);
        assert_eq!(cfg.time_per_sample_us, 2.5);
    }

    #[test]
    fn from_file_reads_a_yaml_document_off_disk() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mode: context_free\ncount_mode: both\nconcurrency: serial").unwrap();

        let cfg = LoadConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.mode, LoadMode::ContextFree);
        assert_eq!(cfg.concurrency, LoadConcurrency::Serial);
    }
}
