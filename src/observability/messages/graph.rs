// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

pub struct GraphValidated {
    pub node_count: usize,
    pub edge_count: usize,
    pub level_count: usize,
}

impl fmt::Display for GraphValidated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dataflow graph validated: {} nodes, {} edges, {} parallel levels",
            self.node_count, self.edge_count, self.level_count
        )
    }
}

pub struct CycleRejected<'a> {
    pub path: &'a [String],
}

impl fmt::Display for CycleRejected<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected connect(): would close cycle {}", self.path.join(" -> "))
    }
}
