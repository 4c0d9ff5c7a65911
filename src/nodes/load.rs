// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The source node of every analysis graph: reads sample files through an
//! injected [`SampleReader`]/[`OffsetResolver`] pair and emits one
//! [`PerformanceTree`] on its `tree` output port.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::builder::{ConcurrencyModel, SampleCountMode, TreeBuildMode, TreeBuilder};
use crate::errors::ExecutionError;
use crate::graph::{GraphNode, NodeValue, PortSpec};
use crate::io::{OffsetResolver, SampleReader};

use super::TREE_TYPE_TAG;

/// Loads sample files into a [`PerformanceTree`](crate::tree::PerformanceTree)
/// under a fixed build configuration (§6 "Load configuration").
pub struct LoadTreeNode {
    sample_files: Vec<PathBuf>,
    library_maps: Vec<PathBuf>,
    reader: Arc<dyn SampleReader>,
    resolver: Arc<dyn OffsetResolver>,
    mode: TreeBuildMode,
    count_mode: SampleCountMode,
    concurrency: ConcurrencyModel,
    num_threads: usize,
    time_per_sample_us: f64,
    output_ports: Vec<PortSpec>,
}

impl LoadTreeNode {
    pub fn new(
        sample_files: Vec<PathBuf>,
        reader: Arc<dyn SampleReader>,
        resolver: Arc<dyn OffsetResolver>,
    ) -> Self {
        Self {
            sample_files,
            library_maps: Vec::new(),
            reader,
            resolver,
            mode: TreeBuildMode::ContextFree,
            count_mode: SampleCountMode::Both,
            concurrency: ConcurrencyModel::Serial,
            num_threads: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            time_per_sample_us: 1.0,
            output_ports: vec![PortSpec::new("tree", TREE_TYPE_TAG)],
        }
    }

    pub fn with_library_maps(mut self, maps: Vec<PathBuf>) -> Self {
        self.library_maps = maps;
        self
    }

    pub fn with_mode(mut self, mode: TreeBuildMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_count_mode(mut self, count_mode: SampleCountMode) -> Self {
        self.count_mode = count_mode;
        self
    }

    pub fn with_concurrency(mut self, model: ConcurrencyModel) -> Self {
        self.concurrency = model;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads.max(1);
        self
    }

    pub fn with_time_per_sample_us(mut self, time_per_sample_us: f64) -> Self {
        self.time_per_sample_us = time_per_sample_us;
        self
    }
}

impl GraphNode for LoadTreeNode {
    fn type_name(&self) -> &str {
        "load_tree"
    }

    fn input_ports(&self) -> &[PortSpec] {
        &[]
    }

    fn output_ports(&self) -> &[PortSpec] {
        &self.output_ports
    }

    fn execute(&self, _inputs: &HashMap<String, NodeValue>) -> Result<HashMap<String, NodeValue>, ExecutionError> {
        let mut builder = TreeBuilder::new(self.mode, self.count_mode, self.concurrency)
            .with_sample_reader(Arc::clone(&self.reader))
            .with_offset_resolver(Arc::clone(&self.resolver));
        builder.set_num_threads(self.num_threads);
        builder.set_time_per_sample_us(self.time_per_sample_us);

        if !self.library_maps.is_empty() {
            builder
                .load_library_maps(&self.library_maps)
                .map_err(|e| ExecutionError::NodeExecutionError {
                    node: self.type_name().to_string(),
                    cause: e.to_string(),
                })?;
        }

        builder
            .build_from_files_parallel(&self.sample_files)
            .map_err(|e| ExecutionError::NodeExecutionError {
                node: self.type_name().to_string(),
                cause: e.to_string(),
            })?;

        let tree = builder.try_tree().map_err(|e| ExecutionError::NodeExecutionError {
            node: self.type_name().to_string(),
            cause: e.to_string(),
        })?;

        let fingerprint = format!("{}:{}", tree.node_count(), tree.total_samples());
        let mut outputs = HashMap::new();
        outputs.insert("tree".to_string(), NodeValue::new(TREE_TYPE_TAG, fingerprint, tree));
        Ok(outputs)
    }
}
