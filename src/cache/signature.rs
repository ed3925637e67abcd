// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Separator signatures: the cache key of a sub-problem.
//!
//! Two sub-problems with equal signatures have the same search space and so
//! the same outcome, wherever they occur in a tree and whichever graph
//! version they came from. The signature therefore names:
//! - the component (vertices, edge ids, special vertex sets),
//! - the connection set its root bag must contain,
//! - the edges permitted in covers,
//! - the width bound,
//! - and a SHA-256 digest of the *content* of everything it references, so
//!   that an edge keeping its id but changing its vertices never matches.
//!
//! All id lists are sorted, so the signature is independent of edge order.

use crate::decomp::DecompNode;
use crate::hypergraph::{Component, Edge, EdgeId, VertexSet};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

const DOMAIN: &[u8] = b"GHD:SIG:v1";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeparatorSignature {
    pub component: VertexSet,
    pub connection: VertexSet,
    pub edges: Vec<EdgeId>,
    pub permissible: Vec<EdgeId>,
    pub specials: Vec<VertexSet>,
    pub width: usize,
    pub digest: [u8; 32],
}

impl SeparatorSignature {
    /// Build the signature of decomposing `component` with root connection
    /// `conn` and covers drawn from `permissible`. `scenes[i]` is the subtree
    /// standing behind `component.specials[i]`, if any.
    pub fn new(
        component: &Component,
        conn: &VertexSet,
        permissible: &[Edge],
        scenes: &[Option<&DecompNode>],
        width: usize,
    ) -> Self {
        let mut edges: Vec<EdgeId> = component.edges.iter().map(|e| e.id).collect();
        edges.sort();
        let mut permissible_sorted: Vec<&Edge> = permissible.iter().collect();
        permissible_sorted.sort_by_key(|e| e.id);
        let mut specials: Vec<VertexSet> =
            component.specials.iter().map(|s| s.vertices.clone()).collect();
        specials.sort();

        let mut hasher = Sha256::new();
        hasher.update(DOMAIN);
        hasher.update((permissible_sorted.len() as u64).to_le_bytes());
        for e in &permissible_sorted {
            hash_edge(&mut hasher, e);
        }
        // Each special is hashed together with its own scene.
        let mut pairs: Vec<(&VertexSet, [u8; 32])> = component
            .specials
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let digest = scenes
                    .get(i)
                    .copied()
                    .flatten()
                    .map_or([0u8; 32], scene_digest);
                (&s.vertices, digest)
            })
            .collect();
        pairs.sort();
        hasher.update((pairs.len() as u64).to_le_bytes());
        for (vertices, digest) in &pairs {
            hash_vertices(&mut hasher, vertices);
            hasher.update(digest);
        }

        Self {
            component: component.vertices.clone(),
            connection: conn.clone(),
            edges,
            permissible: permissible_sorted.iter().map(|e| e.id).collect(),
            specials,
            width,
            digest: hasher.finalize().into(),
        }
    }

    /// Every edge id the signature depends on.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().chain(self.permissible.iter()).copied()
    }
}

impl fmt::Display for SeparatorSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sig({} | conn {} | k={} | {:02x}{:02x}{:02x}{:02x}…)",
            self.component,
            self.connection,
            self.width,
            self.digest[0],
            self.digest[1],
            self.digest[2],
            self.digest[3]
        )
    }
}

fn hash_vertices(hasher: &mut Sha256, vertices: &VertexSet) {
    hasher.update((vertices.len() as u64).to_le_bytes());
    for v in vertices.iter() {
        hasher.update(v.value().to_le_bytes());
    }
}

fn hash_edge(hasher: &mut Sha256, e: &Edge) {
    hasher.update(e.id.value().to_le_bytes());
    hasher.update(e.parent.map_or(u32::MAX, |p| p.value()).to_le_bytes());
    hash_vertices(hasher, &e.vertices);
}

/// Content digest of a reused subtree: bags and covers in pre-order.
fn scene_digest(root: &DecompNode) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"GHD:SCENE:v1");
    for n in root.nodes() {
        hash_vertices(&mut hasher, &n.bag);
        hasher.update((n.cover.len() as u64).to_le_bytes());
        for e in &n.cover {
            hash_edge(&mut hasher, e);
        }
        hasher.update((n.children.len() as u64).to_le_bytes());
    }
    hasher.finalize().into()
}
