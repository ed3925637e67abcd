// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Hypergraph model.
//!
//! This module contains the value types every other module builds on:
//! - Vertex: opaque vertex identifiers
//! - VertexSet: canonical bitset of vertices
//! - Edge / EdgeId: labelled hyperedges and subedges with parent back-references
//! - Graph: an ordered edge list shared read-only across search branches
//! - Component / Special: connected pieces left over after choosing a separator
//! - CoverIter: the fixed enumeration order of candidate edge covers
//!
//! Nothing here fails: malformed input (empty or self-referential edges) is
//! rejected by the parser before a `Graph` is ever built.

pub mod component;
pub mod cover;
pub mod edge;
pub mod graph;
pub mod vertex;
pub mod vertex_set;

// Re-export for convenience
pub use component::{Component, Special};
pub use cover::CoverIter;
pub use edge::{vertices_of, Edge, EdgeId};
pub use graph::Graph;
pub use vertex::Vertex;
pub use vertex_set::VertexSet;
