// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The loosely-typed value that flows across a dataflow edge.
//!
//! Ports are matched by a string type tag rather than Rust's `TypeId` (§4.4),
//! so two nodes written against the same tag can be connected even if they
//! live in different modules. `fingerprint` is a caller-supplied, stable
//! string summary of the value and is the only thing the caching executor
//! (§4.5) ever looks at when deriving a cache key — it never inspects `data`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct NodeValue {
    type_tag: String,
    fingerprint: String,
    data: Arc<dyn Any + Send + Sync>,
}

impl NodeValue {
    pub fn new<T: Any + Send + Sync>(
        type_tag: impl Into<String>,
        fingerprint: impl Into<String>,
        value: T,
    ) -> Self {
        Self {
            type_tag: type_tag.into(),
            fingerprint: fingerprint.into(),
            data: Arc::new(value),
        }
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }
}

impl fmt::Debug for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeValue")
            .field("type_tag", &self.type_tag)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// A named, typed port on a [`crate::graph::GraphNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub name: String,
    pub type_name: String,
    pub required: bool,
}

impl PortSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            required: false,
        }
    }
}
