// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! VertexSet type for representing sets of vertices as bitsets.
//!
//! A VertexSet is a compact representation of a set of vertices using a bitset,
//! where bit i represents the presence of vertex i. Unlike a fixed-size set, the
//! number of words grows with the largest vertex inserted.
//!
//! The representation is canonical: trailing zero words are always trimmed, so
//! two sets with the same members compare (and hash) equal regardless of the
//! order in which they were built. Cache signatures depend on this.
//!
//! # Examples
//!
//! ```
//! use ghd_update::hypergraph::{Vertex, VertexSet};
//!
//! let mut set = VertexSet::empty();
//! set.insert(Vertex::new(1));
//! set.insert(Vertex::new(70));
//!
//! assert_eq!(set.len(), 2);
//! assert!(set.contains(Vertex::new(70)));
//! assert_eq!(format!("{}", set), "{1, 70}");
//! ```

use crate::hypergraph::Vertex;
use serde::{Deserialize, Serialize};
use std::fmt;

const WORD_BITS: usize = 64;

/// A set of vertices represented as a growable bitset.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Vertex>", into = "Vec<Vertex>")]
pub struct VertexSet(Vec<u64>);

impl VertexSet {
    /// Create an empty vertex set.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Create a vertex set from any collection of vertices.
    pub fn from_vertices<I: IntoIterator<Item = Vertex>>(vertices: I) -> Self {
        let mut set = Self::empty();
        for v in vertices {
            set.insert(v);
        }
        set
    }

    /// Check if the set contains a specific vertex.
    pub fn contains(&self, vertex: Vertex) -> bool {
        let idx = vertex.as_usize();
        match self.0.get(idx / WORD_BITS) {
            Some(word) => (word >> (idx % WORD_BITS)) & 1 != 0,
            None => false,
        }
    }

    /// Insert a vertex into the set.
    pub fn insert(&mut self, vertex: Vertex) {
        let idx = vertex.as_usize();
        let word_idx = idx / WORD_BITS;
        if word_idx >= self.0.len() {
            self.0.resize(word_idx + 1, 0);
        }
        self.0[word_idx] |= 1u64 << (idx % WORD_BITS);
    }

    /// Remove a vertex from the set.
    pub fn remove(&mut self, vertex: Vertex) {
        let idx = vertex.as_usize();
        if let Some(word) = self.0.get_mut(idx / WORD_BITS) {
            *word &= !(1u64 << (idx % WORD_BITS));
            self.trim();
        }
    }

    /// Get the number of vertices in the set (population count).
    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all vertices in the set, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.0.iter().enumerate().flat_map(|(word_idx, &word)| {
            let base = word_idx * WORD_BITS;
            (0..WORD_BITS)
                .filter(move |bit| (word >> bit) & 1 != 0)
                .map(move |bit| Vertex::new((base + bit) as u32))
        })
    }

    /// Union of two sets.
    pub fn union(&self, other: &VertexSet) -> VertexSet {
        let mut out = self.clone();
        out.union_with(other);
        out
    }

    /// In-place union.
    pub fn union_with(&mut self, other: &VertexSet) {
        if other.0.len() > self.0.len() {
            self.0.resize(other.0.len(), 0);
        }
        for (w, o) in self.0.iter_mut().zip(other.0.iter()) {
            *w |= o;
        }
    }

    /// Intersection of two sets.
    pub fn intersection(&self, other: &VertexSet) -> VertexSet {
        let mut out = VertexSet(
            self.0
                .iter()
                .zip(other.0.iter())
                .map(|(a, b)| a & b)
                .collect(),
        );
        out.trim();
        out
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &VertexSet) -> VertexSet {
        let mut out = VertexSet(
            self.0
                .iter()
                .enumerate()
                .map(|(i, a)| a & !other.0.get(i).copied().unwrap_or(0))
                .collect(),
        );
        out.trim();
        out
    }

    /// True if every member of `self` is also in `other`.
    pub fn is_subset(&self, other: &VertexSet) -> bool {
        self.0
            .iter()
            .enumerate()
            .all(|(i, a)| a & !other.0.get(i).copied().unwrap_or(0) == 0)
    }

    /// True if the sets share at least one vertex.
    pub fn intersects(&self, other: &VertexSet) -> bool {
        self.0.iter().zip(other.0.iter()).any(|(a, b)| a & b != 0)
    }

    fn trim(&mut self) {
        while self.0.last() == Some(&0) {
            self.0.pop();
        }
    }
}

impl FromIterator<Vertex> for VertexSet {
    fn from_iter<I: IntoIterator<Item = Vertex>>(iter: I) -> Self {
        Self::from_vertices(iter)
    }
}

impl From<Vec<Vertex>> for VertexSet {
    fn from(vertices: Vec<Vertex>) -> Self {
        Self::from_vertices(vertices)
    }
}

impl From<VertexSet> for Vec<Vertex> {
    fn from(set: VertexSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for VertexSet {
    /// Format a vertex set as "{1, 2, 3}".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(vs: &[u32]) -> VertexSet {
        vs.iter().map(|&v| Vertex::new(v)).collect()
    }

    #[test]
    fn test_empty() {
        let s = VertexSet::empty();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert_eq!(format!("{}", s), "{}");
    }

    #[test]
    fn test_insert_contains_across_words() {
        let s = set(&[0, 63, 64, 200]);
        assert_eq!(s.len(), 4);
        assert!(s.contains(Vertex::new(63)));
        assert!(s.contains(Vertex::new(64)));
        assert!(s.contains(Vertex::new(200)));
        assert!(!s.contains(Vertex::new(1)));
        assert!(!s.contains(Vertex::new(5000)));
    }

    #[test]
    fn test_canonical_after_remove() {
        let mut a = set(&[1, 130]);
        a.remove(Vertex::new(130));
        assert_eq!(a, set(&[1]));

        let mut b = set(&[1, 2]);
        b.remove(Vertex::new(1));
        b.remove(Vertex::new(2));
        assert_eq!(b, VertexSet::empty());
    }

    #[test]
    fn test_set_algebra() {
        let a = set(&[1, 2, 3, 100]);
        let b = set(&[3, 4, 100]);
        assert_eq!(a.union(&b), set(&[1, 2, 3, 4, 100]));
        assert_eq!(a.intersection(&b), set(&[3, 100]));
        assert_eq!(a.difference(&b), set(&[1, 2]));
        assert_eq!(b.difference(&a), set(&[4]));
        assert!(set(&[3, 100]).is_subset(&a));
        assert!(!b.is_subset(&a));
        assert!(a.intersects(&b));
        assert!(!set(&[7]).intersects(&a));
    }

    #[test]
    fn test_intersection_trims() {
        let a = set(&[1, 300]);
        let b = set(&[1, 301]);
        assert_eq!(a.intersection(&b), set(&[1]));
    }

    #[test]
    fn test_iter_ascending() {
        let s = set(&[65, 3, 0]);
        let vs: Vec<u32> = s.iter().map(|v| v.value()).collect();
        assert_eq!(vs, vec![0, 3, 65]);
    }

    #[test]
    fn test_serde_as_vertex_list() {
        let s = set(&[2, 9]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "[2,9]");
        let back: VertexSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
