// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Decomposition trees.
//!
//! A [`DecompNode`] is a bag of vertices justified by a cover of edges, with
//! an ordered list of children. Children are held behind `Arc` so that cached
//! outcomes and reused scenes are attached without copying whole subtrees.
//!
//! [`Outcome`] is what every level of the search returns: a subtree, or a
//! plain `Failure` that the caller handles by trying its next cover.

pub mod check;
pub mod restore;

pub use check::CorrectnessChecker;
pub use restore::{apply_restorers, restore_subedges, Restorer, SubedgeRestorer};

use crate::hypergraph::{Edge, Graph, VertexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Origin {
    /// Produced by separator search in this run.
    #[default]
    Searched,
    /// Reused verbatim from a previous decomposition.
    Scene,
}

/// One node of a decomposition tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecompNode {
    pub bag: VertexSet,
    pub cover: Vec<Edge>,
    pub children: Vec<Arc<DecompNode>>,
    #[serde(default)]
    pub origin: Origin,
}

impl DecompNode {
    pub fn new(bag: VertexSet, cover: Vec<Edge>, children: Vec<Arc<DecompNode>>) -> Self {
        Self {
            bag,
            cover,
            children,
            origin: Origin::Searched,
        }
    }

    /// A node with no children.
    pub fn leaf(bag: VertexSet, cover: Vec<Edge>) -> Self {
        Self::new(bag, cover, Vec::new())
    }

    /// Copy of this subtree with every node marked as a reused scene.
    pub fn as_scene(&self) -> DecompNode {
        DecompNode {
            bag: self.bag.clone(),
            cover: self.cover.clone(),
            children: self
                .children
                .iter()
                .map(|c| Arc::new(c.as_scene()))
                .collect(),
            origin: Origin::Scene,
        }
    }

    /// Pre-order traversal of the subtree.
    pub fn nodes(&self) -> Vec<&DecompNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(n) = stack.pop() {
            out.push(n);
            for c in n.children.iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Largest cover in the subtree.
    pub fn width(&self) -> usize {
        self.nodes().iter().map(|n| n.cover.len()).max().unwrap_or(0)
    }

    /// Union of all bags in the subtree.
    pub fn vertices(&self) -> VertexSet {
        let mut out = VertexSet::empty();
        for n in self.nodes() {
            out.union_with(&n.bag);
        }
        out
    }

    /// True if every cover edge can still be found in `graph` (verbatim, or as
    /// a subedge of a parent that still contains it).
    pub fn references_live_edges(&self, graph: &Graph) -> bool {
        self.nodes()
            .iter()
            .all(|n| n.cover.iter().all(|e| graph.resolves(e)))
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let labels: Vec<&str> = self.cover.iter().map(|e| e.label.as_str()).collect();
        let marker = match self.origin {
            Origin::Searched => "",
            Origin::Scene => " [scene]",
        };
        writeln!(
            f,
            "{:indent$}{} {{{}}}{}",
            "",
            self.bag,
            labels.join(", "),
            marker,
            indent = depth * 2
        )?;
        for c in &self.children {
            c.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for DecompNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Result of decomposing one component at one width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success(Arc<DecompNode>),
    Failure,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn node(&self) -> Option<&Arc<DecompNode>> {
        match self {
            Outcome::Success(node) => Some(node),
            Outcome::Failure => None,
        }
    }

    /// A failure references nothing, so it is always live.
    pub fn references_live_edges(&self, graph: &Graph) -> bool {
        match self {
            Outcome::Success(node) => node.references_live_edges(graph),
            Outcome::Failure => true,
        }
    }
}

/// A complete decomposition: root node, the graph it decomposes, and the
/// width bound it was computed under.
#[derive(Debug, Clone)]
pub struct Decomp {
    pub root: Arc<DecompNode>,
    pub graph: Arc<Graph>,
    pub bound: usize,
}

impl Decomp {
    pub fn new(root: Arc<DecompNode>, graph: Arc<Graph>, bound: usize) -> Self {
        Self { root, graph, bound }
    }

    /// Achieved width: the largest cover size across all bags.
    pub fn width(&self) -> usize {
        self.root.width()
    }

    /// Number of nodes marked as reused scenes.
    pub fn scene_nodes(&self) -> usize {
        self.root
            .nodes()
            .iter()
            .filter(|n| n.origin == Origin::Scene)
            .count()
    }

    /// Run the correctness check against the graph this decomposition claims.
    pub fn is_correct(&self) -> bool {
        CorrectnessChecker::check(self, &self.graph)
    }
}

impl fmt::Display for Decomp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
