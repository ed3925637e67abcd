// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Hyperedges and subedges.
//!
//! An edge is a labelled set of vertices. Its [`EdgeId`] is the stable identity
//! used to compare two versions of a hypergraph: an edge whose id survives an
//! update with the same vertices is "unchanged".
//!
//! A subedge is an edge restricted to some vertex set. It carries a
//! back-reference to its parent so that a decomposition computed with
//! subedges can be restored to the original edge space afterwards.

use crate::hypergraph::{Vertex, VertexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(u32);

impl EdgeId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A hyperedge: (label, set of vertices), optionally a subedge of a parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub label: String,
    pub vertices: VertexSet,
    /// Set when this edge is a subedge; names the edge it was cut from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EdgeId>,
}

impl Edge {
    /// Create a new (non-sub) edge.
    pub fn new<I>(id: u32, label: &str, vertices: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self {
            id: EdgeId::new(id),
            label: label.to_string(),
            vertices: vertices.into_iter().map(Vertex::new).collect(),
            parent: None,
        }
    }

    /// Restrict this edge to `vertices`, producing a subedge with the given id.
    ///
    /// The parent reference always points at the original edge, even when
    /// `self` is itself a subedge.
    pub fn subedge(&self, id: EdgeId, vertices: VertexSet) -> Edge {
        Edge {
            id,
            label: format!("{}'", self.label),
            vertices,
            parent: Some(self.origin()),
        }
    }

    pub fn is_subedge(&self) -> bool {
        self.parent.is_some()
    }

    /// Id of the original edge: the parent for subedges, `id` otherwise.
    pub fn origin(&self) -> EdgeId {
        self.parent.unwrap_or(self.id)
    }

    /// True if both edges have the same identity and the same vertices.
    pub fn same_content(&self, other: &Edge) -> bool {
        self.id == other.id && self.vertices == other.vertices
    }
}

impl fmt::Display for Edge {
    /// Format an edge as "label(1, 2, 3)".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.label)?;
        for (i, v) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}

/// Union of the vertices of a collection of edges.
pub fn vertices_of<'a, I>(edges: I) -> VertexSet
where
    I: IntoIterator<Item = &'a Edge>,
{
    let mut out = VertexSet::empty();
    for e in edges {
        out.union_with(&e.vertices);
    }
    out
}
