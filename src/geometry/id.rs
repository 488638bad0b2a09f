// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Session-unique identifiers for vertices and faces

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($name:ident, $prefix:literal) => {
        /// Identity of a mesh entity. Equality is identity: two handles are
        /// the same entity iff their ids match.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub(crate) u64);

        impl $name {
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

entity_id!(VertexId, "v");
entity_id!(FaceId, "f");

/// Monotonic id source shared by the vertices and faces of one mesh.
///
/// Ids are never reissued, not even after the entity they named is deleted.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Issue the next unused id.
    pub fn next(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Whether `id` has already been handed out.
    pub fn is_issued(&self, id: u64) -> bool {
        id < self.next
    }

    /// Mark an explicitly chosen id as issued so it is never allocated again.
    pub fn reserve(&mut self, id: u64) {
        if id >= self.next {
            self.next = id + 1;
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
