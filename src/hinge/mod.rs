// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Hinge partitioning.
//!
//! A hinge is a single edge whose vertex set separates the rest of its
//! component into two or more pieces. Each piece is then decomposed on its
//! own, with the hinge edge as the bag above it, and split further if it
//! has hinges of its own.
//!
//! Only fresh searches use this pass; update searches work on components
//! with scene specials, which hinges do not model.

use crate::decomp::{DecompNode, Outcome};
use crate::errors::DecompResult;
use crate::hypergraph::{Component, Edge, Graph, VertexSet};
use crate::search::SeparatorSearch;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HingeTree {
    /// A component with no usable hinge; decomposed by plain search.
    Piece { component: Component, conn: VertexSet },
    /// A hinge edge and the pieces hanging off it.
    Hinge { edge: Edge, pieces: Vec<HingeTree> },
}

impl HingeTree {
    /// Number of hinge edges in the tree.
    pub fn hinges(&self) -> usize {
        match self {
            HingeTree::Piece { .. } => 0,
            HingeTree::Hinge { pieces, .. } => 1 + pieces.iter().map(|p| p.hinges()).sum::<usize>(),
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            HingeTree::Piece { component, conn } => writeln!(
                f,
                "{:indent$}piece {} (conn {}, {} items)",
                "",
                component.vertices,
                conn,
                component.len(),
                indent = depth * 2
            ),
            HingeTree::Hinge { edge, pieces } => {
                writeln!(f, "{:indent$}hinge {}", "", edge, indent = depth * 2)?;
                for p in pieces {
                    p.fmt_indented(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for HingeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Build the hinge tree of the graph's real edges.
pub fn partition(graph: &Graph) -> HingeTree {
    let root = Component::new(graph.real_edges().cloned().collect(), Vec::new());
    let tree = split(root, VertexSet::empty());
    debug!(hinges = tree.hinges(), "hinge tree built");
    tree
}

/// First edge (in order) that contains `conn` and splits the component.
fn split(component: Component, conn: VertexSet) -> HingeTree {
    for e in &component.edges {
        if !conn.is_subset(&e.vertices) {
            continue;
        }
        let pieces = component.split(&e.vertices);
        if pieces.len() >= 2 {
            let pieces = pieces
                .into_iter()
                .map(|p| {
                    let c = p.vertices.intersection(&e.vertices);
                    split(p, c)
                })
                .collect();
            return HingeTree::Hinge {
                edge: e.clone(),
                pieces,
            };
        }
    }
    HingeTree::Piece { component, conn }
}

/// Decompose every piece (in parallel) and hang the results under their
/// hinge nodes. Any failing piece fails the whole tree.
pub fn decompose_hinge(search: &SeparatorSearch<'_>, tree: &HingeTree) -> DecompResult<Outcome> {
    match tree {
        HingeTree::Piece { component, conn } => search.solve(component, conn),
        HingeTree::Hinge { edge, pieces } => {
            let results: Vec<DecompResult<Outcome>> = pieces
                .par_iter()
                .map(|p| decompose_hinge(search, p))
                .collect();
            let mut children = Vec::with_capacity(results.len());
            for r in results {
                match r? {
                    Outcome::Success(node) => children.push(node),
                    Outcome::Failure => return Ok(Outcome::Failure),
                }
            }
            Ok(Outcome::Success(Arc::new(DecompNode::new(
                edge.vertices.clone(),
                vec![edge.clone()],
                children,
            ))))
        }
    }
}
