// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::time::Duration;

pub struct LevelStarted {
    pub level_index: usize,
    pub node_count: usize,
}

impl fmt::Display for LevelStarted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "executing level {} ({} nodes)", self.level_index, self.node_count)
    }
}

pub struct NodeCompleted<'a> {
    pub node: &'a str,
    pub elapsed: Duration,
}

impl fmt::Display for NodeCompleted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node '{}' completed in {:?}", self.node, self.elapsed)
    }
}

pub struct NodeFailed<'a> {
    pub node: &'a str,
    pub cause: &'a str,
}

impl fmt::Display for NodeFailed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node '{}' failed: {}", self.node, self.cause)
    }
}

pub struct CacheOutcome<'a> {
    pub node: &'a str,
    pub hit: bool,
    pub key: &'a str,
}

impl fmt::Display for CacheOutcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.hit { "hit" } else { "miss" };
        write!(f, "cache {} for node '{}' (key {})", outcome, self.node, self.key)
    }
}
