// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Scene extraction.
//!
//! A scene is a subtree of an old decomposition that an edit did not touch,
//! and that can therefore be reused verbatim. A subtree rooted at a node
//! with boundary B (its bag ∩ its parent's bag) is a scene when:
//! - none of its cover edges changed,
//! - no changed edge (old or new version) meets B,
//! - no changed edge (old or new version) lies inside any of its bags.
//!
//! The old tree is walked once from the root; an accepted subtree is not
//! searched further, so only maximal scenes are kept.

use crate::decomp::{Decomp, DecompNode};
use crate::hypergraph::{Edge, EdgeId, Graph, VertexSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Edges that differ between two graph versions, compared by id and content.
#[derive(Debug, Clone, Default)]
pub struct EdgeDiff {
    /// Old versions of removed or changed edges.
    pub removed: Vec<Edge>,
    /// New versions of added or changed edges.
    pub added: Vec<Edge>,
    ids: HashSet<EdgeId>,
}

impl EdgeDiff {
    pub fn between(old: &Graph, new: &Graph) -> Self {
        let mut diff = EdgeDiff::default();
        for e in old.real_edges().filter(|e| !new.contains_edge(e)) {
            diff.ids.insert(e.id);
            diff.removed.push(e.clone());
        }
        for e in new.real_edges().filter(|e| !old.contains_edge(e)) {
            diff.ids.insert(e.id);
            diff.added.push(e.clone());
        }
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// True if the edge with this id was added, removed or changed.
    pub fn contains(&self, id: EdgeId) -> bool {
        self.ids.contains(&id)
    }

    fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.removed.iter().chain(self.added.iter())
    }

    fn touches(&self, vertices: &VertexSet) -> bool {
        self.edges().any(|e| e.vertices.intersects(vertices))
    }
}

/// A reusable subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub boundary: VertexSet,
    pub root: Arc<DecompNode>,
    /// Union of the subtree's bags.
    pub vertices: VertexSet,
    /// Unchanged edges contained in some bag of the subtree, sorted.
    pub owned: Vec<EdgeId>,
}

impl Scene {
    pub fn key(&self) -> SceneKey {
        SceneKey {
            boundary: self.boundary.clone(),
            owned: self.owned.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SceneKey {
    pub boundary: VertexSet,
    pub owned: Vec<EdgeId>,
}

/// Scenes keyed by boundary and owned edges, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedScenes {
    scenes: BTreeMap<SceneKey, Scene>,
}

impl SavedScenes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scene: Scene) {
        self.scenes.insert(scene.key(), scene);
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn get(&self, key: &SceneKey) -> Option<&Scene> {
        self.scenes.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }
}

pub struct SceneExtractor;

impl SceneExtractor {
    /// Collect the maximal scenes of `old` that survive the edit from
    /// `old_graph` to `new_graph`.
    pub fn extract(old: &Decomp, old_graph: &Graph, new_graph: &Graph) -> SavedScenes {
        let diff = EdgeDiff::between(old_graph, new_graph);
        let mut saved = SavedScenes::new();
        let mut stack: Vec<(&DecompNode, VertexSet)> =
            vec![(old.root.as_ref(), VertexSet::empty())];
        while let Some((node, boundary)) = stack.pop() {
            if Self::is_scene(node, &boundary, &diff) {
                let vertices = node.vertices();
                let mut owned: Vec<EdgeId> = old_graph
                    .real_edges()
                    .filter(|e| !diff.contains(e.id) && contained_in(node, &e.vertices))
                    .map(|e| e.id)
                    .collect();
                owned.sort();
                saved.insert(Scene {
                    boundary,
                    root: Arc::new(node.as_scene()),
                    vertices,
                    owned,
                });
                continue;
            }
            for c in node.children.iter().rev() {
                stack.push((c.as_ref(), c.bag.intersection(&node.bag)));
            }
        }
        debug!(scenes = saved.len(), changed = diff.ids.len(), "scenes extracted");
        saved
    }

    fn is_scene(node: &DecompNode, boundary: &VertexSet, diff: &EdgeDiff) -> bool {
        if diff.touches(boundary) {
            return false;
        }
        let nodes = node.nodes();
        let covers_unchanged = nodes
            .iter()
            .all(|n| n.cover.iter().all(|e| !diff.contains(e.origin())));
        let nothing_changed_inside = diff.edges().all(|e| !contained_in(node, &e.vertices));
        covers_unchanged && nothing_changed_inside
    }
}

/// True if some bag of the subtree holds all of `vertices`.
pub(crate) fn contained_in(root: &DecompNode, vertices: &VertexSet) -> bool {
    root.nodes().iter().any(|n| vertices.is_subset(&n.bag))
}
