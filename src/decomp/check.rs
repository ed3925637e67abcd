// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Correctness checking for decompositions.
//!
//! A tree is a valid generalized hypertree decomposition of width ≤ K when:
//! 1. every bag is contained in the vertices of its cover, and every cover
//!    edge belongs to the graph (directly or as a subedge of a graph edge);
//! 2. every cover has at most K edges;
//! 3. every edge of the graph is contained in some bag;
//! 4. for every vertex, the nodes whose bags contain it form a connected
//!    subtree (running intersection).
//!
//! The checker reports rather than fails: it never panics, never mutates its
//! input, and returns the first violation it finds.

use crate::decomp::{Decomp, DecompNode};
use crate::hypergraph::{vertices_of, Edge, Graph, Vertex, VertexSet};
use std::collections::HashMap;
use std::fmt;

/// The first thing found wrong with a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A bag contains vertices its cover does not justify.
    UnjustifiedBag { bag: VertexSet, missing: VertexSet },

    /// A cover edge is not part of the graph.
    UnknownCoverEdge { edge: String },

    /// A cover is larger than the width bound.
    WidthExceeded { cover_size: usize, bound: usize },

    /// An edge of the graph is not contained in any bag.
    UncoveredEdge { edge: String },

    /// The nodes containing a vertex are not connected.
    Disconnected { vertex: Vertex },

    /// The root bag does not contain the required connection vertices.
    MissingConnection { missing: VertexSet },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnjustifiedBag { bag, missing } => {
                write!(f, "bag {} not covered by its edges (missing {})", bag, missing)
            }
            Violation::UnknownCoverEdge { edge } => {
                write!(f, "cover edge {} is not in the graph", edge)
            }
            Violation::WidthExceeded { cover_size, bound } => {
                write!(f, "cover of size {} exceeds width {}", cover_size, bound)
            }
            Violation::UncoveredEdge { edge } => write!(f, "edge {} is in no bag", edge),
            Violation::Disconnected { vertex } => {
                write!(f, "bags containing vertex {} are not connected", vertex)
            }
            Violation::MissingConnection { missing } => {
                write!(f, "root bag is missing connection vertices {}", missing)
            }
        }
    }
}

/// Stateless checker; all methods are associated functions.
pub struct CorrectnessChecker;

impl CorrectnessChecker {
    /// Validate `decomp` against `graph` with the decomposition's own bound.
    pub fn check(decomp: &Decomp, graph: &Graph) -> bool {
        Self::diagnose(decomp, graph).is_none()
    }

    /// Like [`check`](Self::check), but says what is wrong.
    pub fn diagnose(decomp: &Decomp, graph: &Graph) -> Option<Violation> {
        let edges: Vec<&Edge> = graph.real_edges().collect();
        Self::diagnose_node(&decomp.root, graph, &edges, &VertexSet::empty(), decomp.bound)
    }

    /// Validate a subtree as a decomposition of `edges` whose root must
    /// contain `conn`. Used to audit cache entries.
    pub fn check_component(
        node: &DecompNode,
        graph: &Graph,
        edges: &[Edge],
        conn: &VertexSet,
        bound: usize,
    ) -> bool {
        let edges: Vec<&Edge> = edges.iter().collect();
        Self::diagnose_node(node, graph, &edges, conn, bound).is_none()
    }

    fn diagnose_node(
        root: &DecompNode,
        graph: &Graph,
        edges: &[&Edge],
        conn: &VertexSet,
        bound: usize,
    ) -> Option<Violation> {
        if !conn.is_subset(&root.bag) {
            return Some(Violation::MissingConnection {
                missing: conn.difference(&root.bag),
            });
        }
        let nodes = root.nodes();
        for n in &nodes {
            if let Some(v) = Self::check_node(n, graph, bound) {
                return Some(v);
            }
        }
        for e in edges {
            if !nodes.iter().any(|n| e.vertices.is_subset(&n.bag)) {
                return Some(Violation::UncoveredEdge {
                    edge: e.to_string(),
                });
            }
        }
        Self::check_connectedness(root)
    }

    /// Cover size and cover justification for a single node.
    fn check_node(node: &DecompNode, graph: &Graph, bound: usize) -> Option<Violation> {
        if node.cover.len() > bound {
            return Some(Violation::WidthExceeded {
                cover_size: node.cover.len(),
                bound,
            });
        }
        if let Some(e) = node.cover.iter().find(|e| !graph.resolves(e)) {
            return Some(Violation::UnknownCoverEdge {
                edge: e.to_string(),
            });
        }
        let covered = vertices_of(&node.cover);
        if !node.bag.is_subset(&covered) {
            return Some(Violation::UnjustifiedBag {
                bag: node.bag.clone(),
                missing: node.bag.difference(&covered),
            });
        }
        None
    }

    /// Running intersection: each vertex may "enter" the tree only once,
    /// i.e. appear in at most one node whose parent bag lacks it.
    fn check_connectedness(root: &DecompNode) -> Option<Violation> {
        let mut entries: HashMap<Vertex, usize> = HashMap::new();
        let mut stack: Vec<(&DecompNode, Option<&VertexSet>)> = vec![(root, None)];
        while let Some((node, parent_bag)) = stack.pop() {
            for v in node.bag.iter() {
                if parent_bag.map_or(true, |p| !p.contains(v)) {
                    let count = entries.entry(v).or_insert(0);
                    *count += 1;
                    if *count > 1 {
                        return Some(Violation::Disconnected { vertex: v });
                    }
                }
            }
            for c in &node.children {
                stack.push((c.as_ref(), Some(&node.bag)));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn vs(v: &[u32]) -> VertexSet {
        v.iter().map(|&x| Vertex::new(x)).collect()
    }

    fn graph() -> Graph {
        Graph::new(vec![
            Edge::new(0, "a", [1, 2]),
            Edge::new(1, "b", [2, 3]),
            Edge::new(2, "c", [3, 4]),
        ])
    }

    fn good_tree(g: &Graph) -> DecompNode {
        let e = |i: usize| g.edges()[i].clone();
        DecompNode::new(
            vs(&[2, 3]),
            vec![e(1)],
            vec![
                Arc::new(DecompNode::leaf(vs(&[1, 2]), vec![e(0)])),
                Arc::new(DecompNode::leaf(vs(&[3, 4]), vec![e(2)])),
            ],
        )
    }

    fn decomp(root: DecompNode, g: &Graph, bound: usize) -> Decomp {
        Decomp::new(Arc::new(root), Arc::new(g.clone()), bound)
    }

    #[test]
    fn test_valid_tree() {
        let g = graph();
        let d = decomp(good_tree(&g), &g, 1);
        assert!(CorrectnessChecker::check(&d, &g));
        assert!(d.is_correct());
    }

    #[test]
    fn test_width_exceeded() {
        let g = graph();
        let mut root = good_tree(&g);
        root.cover.push(g.edges()[0].clone());
        let d = decomp(root, &g, 1);
        assert_eq!(
            CorrectnessChecker::diagnose(&d, &g),
            Some(Violation::WidthExceeded {
                cover_size: 2,
                bound: 1
            })
        );
    }

    #[test]
    fn test_uncovered_edge() {
        let g = graph();
        let mut root = good_tree(&g);
        root.children.pop();
        let d = decomp(root, &g, 1);
        assert!(matches!(
            CorrectnessChecker::diagnose(&d, &g),
            Some(Violation::UncoveredEdge { .. })
        ));
    }

    #[test]
    fn test_unjustified_bag() {
        let g = graph();
        let mut root = good_tree(&g);
        root.bag = vs(&[2, 3, 4]);
        let d = decomp(root, &g, 1);
        assert!(matches!(
            CorrectnessChecker::diagnose(&d, &g),
            Some(Violation::UnjustifiedBag { .. })
        ));
    }

    #[test]
    fn test_disconnected_vertex() {
        let g = graph();
        let e = |i: usize| g.edges()[i].clone();
        // Vertex 1 appears in two leaves whose common parent lacks it.
        let root = DecompNode::new(
            vs(&[2, 3]),
            vec![e(1)],
            vec![
                Arc::new(DecompNode::leaf(vs(&[1, 2]), vec![e(0)])),
                Arc::new(DecompNode::new(
                    vs(&[3, 4]),
                    vec![e(2)],
                    vec![Arc::new(DecompNode::leaf(vs(&[1]), vec![e(0)]))],
                )),
            ],
        );
        let d = decomp(root, &g, 1);
        assert_eq!(
            CorrectnessChecker::diagnose(&d, &g),
            Some(Violation::Disconnected {
                vertex: Vertex::new(1)
            })
        );
    }

    #[test]
    fn test_foreign_cover_edge() {
        let g = graph();
        let mut root = good_tree(&g);
        root.cover = vec![Edge::new(1, "b", [2, 3, 9])];
        let d = decomp(root, &g, 1);
        assert!(matches!(
            CorrectnessChecker::diagnose(&d, &g),
            Some(Violation::UnknownCoverEdge { .. })
        ));
    }

    #[test]
    fn test_check_component_requires_connection() {
        let g = graph();
        let leaf = DecompNode::leaf(vs(&[1, 2]), vec![g.edges()[0].clone()]);
        let edges = vec![g.edges()[0].clone()];
        assert!(CorrectnessChecker::check_component(&leaf, &g, &edges, &vs(&[2]), 1));
        assert!(!CorrectnessChecker::check_component(&leaf, &g, &edges, &vs(&[3]), 1));
    }
}
