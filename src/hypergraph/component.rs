// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Components and the component-split operation.
//!
//! A component is a set of *items* that are connected through vertices not
//! in the current separator bag. Items are ordinary edges, plus "specials":
//! bare vertex sets standing in for an already-decomposed part of the graph
//! (a reused scene during an update). A special must end up inside a single
//! bag, but can never be used to cover one.

use crate::hypergraph::edge::vertices_of;
use crate::hypergraph::{Edge, Vertex, VertexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A vertex set that must be placed inside one bag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Special {
    /// Index into the scene table of the running search.
    pub id: usize,
    pub vertices: VertexSet,
}

/// A connected piece of the hypergraph, identified by its vertex set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub edges: Vec<Edge>,
    pub specials: Vec<Special>,
    pub vertices: VertexSet,
}

impl Component {
    pub fn new(edges: Vec<Edge>, specials: Vec<Special>) -> Self {
        let mut vertices = vertices_of(&edges);
        for s in &specials {
            vertices.union_with(&s.vertices);
        }
        Self {
            edges,
            specials,
            vertices,
        }
    }

    /// Number of items (edges plus specials).
    pub fn len(&self) -> usize {
        self.edges.len() + self.specials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.specials.is_empty()
    }

    fn item_vertices(&self, i: usize) -> &VertexSet {
        if i < self.edges.len() {
            &self.edges[i].vertices
        } else {
            &self.specials[i - self.edges.len()].vertices
        }
    }

    /// Partition the items not contained in `bag` into maximal components
    /// connected through vertices outside `bag`.
    ///
    /// Items entirely inside `bag` are dropped (the bag covers them).
    /// Components are ordered by the position of their first item, edges
    /// before specials, so the split is deterministic.
    pub fn split(&self, bag: &VertexSet) -> Vec<Component> {
        let n = self.len();
        let mut parent: Vec<usize> = (0..n).collect();
        let mut owner: HashMap<Vertex, usize> = HashMap::new();
        let mut outside_bag = vec![false; n];

        for i in 0..n {
            let outside = self.item_vertices(i).difference(bag);
            if outside.is_empty() {
                continue;
            }
            outside_bag[i] = true;
            for v in outside.iter() {
                match owner.get(&v) {
                    Some(&j) => union(&mut parent, i, j),
                    None => {
                        owner.insert(v, i);
                    }
                }
            }
        }

        let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut group_of_root: HashMap<usize, usize> = HashMap::new();
        for i in (0..n).filter(|&i| outside_bag[i]) {
            let root = find(&mut parent, i);
            let g = *group_of_root.entry(root).or_insert_with(|| {
                groups.push((i, Vec::new()));
                groups.len() - 1
            });
            groups[g].1.push(i);
        }

        groups
            .into_iter()
            .map(|(_, members)| {
                let mut edges = Vec::new();
                let mut specials = Vec::new();
                for i in members {
                    if i < self.edges.len() {
                        edges.push(self.edges[i].clone());
                    } else {
                        specials.push(self.specials[i - self.edges.len()].clone());
                    }
                }
                Component::new(edges, specials)
            })
            .collect()
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Keep the smaller index as root.
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[hi] = lo;
    }
}
