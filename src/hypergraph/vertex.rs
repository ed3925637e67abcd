// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Vertex identifiers.
//!
//! Vertices are opaque small integers handed to us by the parser. Their
//! names (if any) live with the parser's encoding, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A hypergraph vertex.
///
/// This is a newtype wrapper to prevent mixing vertices with edge ids or
/// other integer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vertex(u32);

impl Vertex {
    /// Create a new vertex.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the underlying value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Get the vertex as a usize (for bitset indexing).
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Vertex {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_new() {
        let v = Vertex::new(7);
        assert_eq!(v.value(), 7);
        assert_eq!(v.as_usize(), 7);
    }

    #[test]
    fn test_vertex_ordering() {
        assert!(Vertex::new(1) < Vertex::new(2));
        assert_eq!(Vertex::from(3), Vertex::new(3));
    }
}
