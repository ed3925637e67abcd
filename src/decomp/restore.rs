// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Restoring a decomposition into the original edge space.
//!
//! Restoration is a pure function from tree to tree: it never touches the
//! input, so concurrent branches can share subtrees freely. The core only
//! ships the subedge restorer; reductions applied before search (GYÖ,
//! type collapse) plug in their own [`Restorer`].

use crate::decomp::{Decomp, DecompNode};
use crate::errors::{DecompError, DecompResult};
use crate::hypergraph::{Edge, EdgeId, Graph};
use std::collections::HashSet;
use std::sync::Arc;

/// A post-hoc expansion of a tree. Failure is fatal for the run.
pub trait Restorer {
    fn restore(&self, root: &DecompNode) -> DecompResult<DecompNode>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Replaces every subedge in a cover by its parent edge from `graph`.
pub struct SubedgeRestorer<'a> {
    pub graph: &'a Graph,
}

impl Restorer for SubedgeRestorer<'_> {
    fn restore(&self, root: &DecompNode) -> DecompResult<DecompNode> {
        restore_node(root, self.graph)
    }

    fn name(&self) -> &str {
        "subedges"
    }
}

fn restore_node(node: &DecompNode, graph: &Graph) -> DecompResult<DecompNode> {
    let mut seen: HashSet<EdgeId> = HashSet::new();
    let mut cover: Vec<Edge> = Vec::with_capacity(node.cover.len());
    for e in &node.cover {
        let restored = match e.parent {
            None => e.clone(),
            Some(parent) => graph
                .edge(parent)
                .filter(|p| !p.is_subedge())
                .cloned()
                .ok_or_else(|| {
                    DecompError::RestorationFailure(format!(
                        "parent {} of subedge {} not found",
                        parent, e
                    ))
                })?,
        };
        // Two subedges of the same parent collapse into one cover edge.
        if seen.insert(restored.id) {
            cover.push(restored);
        }
    }
    let children = node
        .children
        .iter()
        .map(|c| restore_node(c, graph).map(Arc::new))
        .collect::<DecompResult<Vec<_>>>()?;
    Ok(DecompNode {
        bag: node.bag.clone(),
        cover,
        children,
        origin: node.origin,
    })
}

/// Restore subedges of `decomp` against the graph it claims to decompose.
pub fn restore_subedges(decomp: &Decomp) -> DecompResult<Decomp> {
    let restorer = SubedgeRestorer {
        graph: &decomp.graph,
    };
    Ok(Decomp::new(
        Arc::new(restorer.restore(&decomp.root)?),
        decomp.graph.clone(),
        decomp.bound,
    ))
}

/// Apply restorers in order, stopping at the first failure.
pub fn apply_restorers(decomp: &Decomp, restorers: &[&dyn Restorer]) -> DecompResult<Decomp> {
    let mut root = decomp.root.clone();
    for r in restorers {
        root = Arc::new(r.restore(&root).inspect_err(|e| {
            tracing::error!(restorer = r.name(), error = %e, "restoration failed");
        })?);
    }
    Ok(Decomp::new(root, decomp.graph.clone(), decomp.bound))
}
