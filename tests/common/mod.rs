// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use ghd_update::{Edge, Graph, Vertex, VertexSet};
use std::sync::Arc;

/// Build a graph from (label, vertices) pairs; ids follow list position.
pub fn graph(edges: &[(&str, &[u32])]) -> Arc<Graph> {
    Arc::new(Graph::new(
        edges
            .iter()
            .enumerate()
            .map(|(i, (label, vertices))| Edge::new(i as u32, label, vertices.iter().copied()))
            .collect(),
    ))
}

/// Build a graph from explicit (id, label, vertices) triples.
pub fn graph_with_ids(edges: &[(u32, &str, &[u32])]) -> Arc<Graph> {
    Arc::new(Graph::new(
        edges
            .iter()
            .map(|(id, label, vertices)| Edge::new(*id, label, vertices.iter().copied()))
            .collect(),
    ))
}

pub fn vs(vertices: &[u32]) -> VertexSet {
    vertices.iter().map(|&v| Vertex::new(v)).collect()
}

/// a:{1,2}, b:{2,3}, c:{3,4}
pub fn path() -> Arc<Graph> {
    graph_with_ids(&[(0, "a", &[1, 2]), (1, "b", &[2, 3]), (2, "c", &[3, 4])])
}

/// The path with c replaced by d:{3,1}.
pub fn path_with_c_replaced() -> Arc<Graph> {
    graph_with_ids(&[(0, "a", &[1, 2]), (1, "b", &[2, 3]), (3, "d", &[3, 1])])
}

/// The cycle 0-1-...-(n-1)-0 as binary edges.
pub fn cycle(n: u32) -> Arc<Graph> {
    Arc::new(Graph::new(
        (0..n)
            .map(|i| Edge::new(i, &format!("e{}", i), [i, (i + 1) % n]))
            .collect(),
    ))
}

/// Two cycles of length `n` sharing vertex 0, with ids offset for the second.
pub fn figure_eight(n: u32) -> Arc<Graph> {
    let mut edges: Vec<Edge> = cycle(n).edges().to_vec();
    for i in 0..n {
        let a = if i == 0 { 0 } else { n + i - 1 };
        let b = if i == n - 1 { 0 } else { n + i };
        edges.push(Edge::new(n + i, &format!("f{}", i), [a, b]));
    }
    Arc::new(Graph::new(edges))
}

/// The complete graph on `n` vertices as binary edges.
pub fn clique(n: u32) -> Arc<Graph> {
    let pairs = (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j)));
    Arc::new(Graph::new(
        pairs
            .enumerate()
            .map(|(id, (i, j))| Edge::new(id as u32, &format!("k{}_{}", i, j), [i, j]))
            .collect(),
    ))
}
