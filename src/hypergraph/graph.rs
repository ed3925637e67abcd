// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Hypergraphs and subedge materialization.
//!
//! A [`Graph`] is built once and then shared read-only (behind an `Arc`) by
//! every search branch. The order of its edge list is significant: it is the
//! order in which covers are enumerated.

use crate::hypergraph::cover::CoverIter;
use crate::hypergraph::edge::vertices_of;
use crate::hypergraph::{Edge, EdgeId, Vertex, VertexSet};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// An edge set plus its derived vertex set.
#[derive(Debug, Clone)]
pub struct Graph {
    edges: Vec<Edge>,
    vertices: VertexSet,
    index: HashMap<EdgeId, usize>,
}

impl Graph {
    /// Build a graph from an ordered edge list.
    ///
    /// Edge ids are expected to be unique; if not, lookups by id see the
    /// first occurrence.
    pub fn new(edges: Vec<Edge>) -> Self {
        let vertices = vertices_of(&edges);
        let mut index = HashMap::with_capacity(edges.len());
        for (i, e) in edges.iter().enumerate() {
            index.entry(e.id).or_insert(i);
        }
        Self {
            edges,
            vertices,
            index,
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges that are not subedges, in graph order.
    pub fn real_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| !e.is_subedge())
    }

    pub fn vertices(&self) -> &VertexSet {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains_vertex(&self, v: Vertex) -> bool {
        self.vertices.contains(v)
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.index.get(&id).map(|&i| &self.edges[i])
    }

    /// True if an edge with the same id and the same vertices is present.
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edge(edge.id).is_some_and(|e| e.same_content(edge))
    }

    /// True if `edge` is either present verbatim, or is a subedge whose
    /// parent is present and still contains it.
    pub fn resolves(&self, edge: &Edge) -> bool {
        if self.contains_edge(edge) {
            return true;
        }
        match edge.parent {
            Some(parent) => self
                .edge(parent)
                .is_some_and(|p| !p.is_subedge() && edge.vertices.is_subset(&p.vertices)),
            None => false,
        }
    }

    /// Largest edge id in use, or None for an empty graph.
    pub fn max_edge_id(&self) -> Option<EdgeId> {
        self.edges.iter().map(|e| e.id).max()
    }

    /// Id to use for the first freshly minted subedge.
    pub fn next_edge_id(&self) -> u32 {
        self.max_edge_id().map_or(0, |id| id.value() + 1)
    }

    /// Add global subedges: for each edge e and each combination of at most
    /// `k` other edges, the restriction of e to the combination's vertices.
    ///
    /// Only proper, non-empty restrictions with a vertex set not already
    /// present are added. The result keeps the original edges first.
    pub fn compute_subedges(&self, k: usize) -> Graph {
        self.compute_subedges_until(k, || false)
            .unwrap_or_else(|| self.clone())
    }

    /// [`compute_subedges`](Self::compute_subedges), abandoned with `None`
    /// as soon as `stop` returns true. `stop` is polled once per combination.
    pub fn compute_subedges_until<F>(&self, k: usize, stop: F) -> Option<Graph>
    where
        F: Fn() -> bool,
    {
        let mut seen: HashSet<VertexSet> = self.edges.iter().map(|e| e.vertices.clone()).collect();
        let mut next_id = self.next_edge_id();
        let mut edges = self.edges.clone();

        for e in self.real_edges() {
            let others: Vec<&Edge> = self.real_edges().filter(|o| o.id != e.id).collect();
            for combo in CoverIter::new(others.len(), k) {
                if stop() {
                    return None;
                }
                let restricted =
                    e.vertices.intersection(&vertices_of(combo.iter().map(|&i| others[i])));
                if restricted.is_empty() || restricted == e.vertices {
                    continue;
                }
                if seen.insert(restricted.clone()) {
                    edges.push(e.subedge(EdgeId::new(next_id), restricted));
                    next_id += 1;
                }
            }
        }
        Some(Graph::new(edges))
    }

    /// Subedges local to one component: each candidate restricted to
    /// `within`, and pairwise intersections of candidates inside `within`.
    ///
    /// Ids are minted from `first_id` upward in a fixed order, so the same
    /// inputs always give the same subedges.
    pub fn local_subedges(candidates: &[Edge], within: &VertexSet, first_id: u32) -> Vec<Edge> {
        let mut seen: HashSet<VertexSet> = candidates.iter().map(|e| e.vertices.clone()).collect();
        let mut next_id = first_id;
        let mut out = Vec::new();

        for (i, e) in candidates.iter().enumerate() {
            let mut restrictions = vec![e.vertices.intersection(within)];
            for (j, f) in candidates.iter().enumerate() {
                if i != j {
                    restrictions.push(e.vertices.intersection(&f.vertices).intersection(within));
                }
            }
            for r in restrictions {
                if r.is_empty() || r == e.vertices {
                    continue;
                }
                if seen.insert(r.clone()) {
                    out.push(e.subedge(EdgeId::new(next_id), r));
                    next_id += 1;
                }
            }
        }
        out
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.edges.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}
