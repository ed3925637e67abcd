// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Separator search.
//!
//! A bounded-width search in the style of det-k-decomp. To decompose a
//! component with connection set `conn`:
//!
//! 1. **Base cases.** A component that is a single special (a reused scene)
//!    is answered by the scene itself. A component of at most K edges whose
//!    vertices contain `conn` and every special becomes a leaf.
//! 2. **Covers.** Otherwise candidate covers are enumerated by [`CoverIter`]
//!    over the permissible edges. The bag is the cover's vertices restricted
//!    to the component. A cover is admissible when the bag contains `conn`
//!    and at least one vertex beyond it, so every sub-component has fewer
//!    vertices outside its own connection set.
//! 3. **Recursion.** Each sub-component is solved through the cache. The
//!    first cover whose sub-components all succeed wins.
//!
//! Failing at a width is not an error: it is [`Outcome::Failure`], stored in
//! the cache like a success. Only cancellation escapes as `Err`, and a
//! cancelled branch never stores anything.
//!
//! # Ordering
//!
//! With balancing on, covers whose sub-components each hold at most
//! ⌊n·(f−1)/f⌋ of the n items are tried first, in enumeration order, then the
//! rest. Candidate covers are explored in chunks on the rayon pool with
//! `find_map_first`, so parallel and sequential runs pick the same cover.

pub mod cancel;
pub mod driver;
pub mod statistics;

pub use cancel::CancelToken;
pub use driver::{
    decompose_with_config, Algorithm, ApproximateSolver, DetKSolver, ExactSolver, UpdateAlgorithm,
};
pub use statistics::{Counters, Statistics};

use crate::cache::{CacheHandle, SeparatorSignature};
use crate::config::{Balance, SearchConfig, SubedgeMode};
use crate::decomp::{DecompNode, Outcome};
use crate::errors::DecompResult;
use crate::hypergraph::cover::binomial;
use crate::hypergraph::{vertices_of, Component, CoverIter, Edge, Graph, Special, VertexSet};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, trace};

/// Number of covers handed to the pool at once.
const COVER_CHUNK: usize = 64;

/// Which covers a pass over the enumeration admits.
#[derive(Debug, Clone, Copy)]
enum Pass {
    Any,
    Balanced(usize),
    Unbalanced(usize),
}

impl Pass {
    fn admits(self, subs: &[Component]) -> bool {
        match self {
            Pass::Any => true,
            Pass::Balanced(limit) => subs.iter().all(|s| s.len() <= limit),
            Pass::Unbalanced(limit) => subs.iter().any(|s| s.len() > limit),
        }
    }
}

/// One search at a fixed width bound.
///
/// Cheap to build; the graph, cache and statistics are shared with the
/// caller. Scenes are indexed by [`Special::id`].
pub struct SeparatorSearch<'a> {
    graph: Arc<Graph>,
    width: usize,
    balance: Balance,
    local_subedges: bool,
    parallel: bool,
    cache: &'a dyn CacheHandle,
    stats: Arc<Statistics>,
    cancel: CancelToken,
    scenes: Vec<Arc<DecompNode>>,
}

impl<'a> SeparatorSearch<'a> {
    /// Covers are drawn from every edge of `graph`, including any global
    /// subedges it carries.
    pub fn new(graph: Arc<Graph>, width: usize, cache: &'a dyn CacheHandle) -> Self {
        Self {
            graph,
            width,
            balance: Balance::default(),
            local_subedges: false,
            parallel: true,
            cache,
            stats: Arc::new(Statistics::new()),
            cancel: CancelToken::new(),
            scenes: Vec::new(),
        }
    }

    pub fn configure(mut self, config: &SearchConfig) -> Self {
        self.balance = config.balance;
        self.local_subedges = config.subedges == SubedgeMode::Local;
        self.parallel = config.parallel;
        self
    }

    pub fn with_stats(mut self, stats: Arc<Statistics>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_scenes(mut self, scenes: Vec<Arc<DecompNode>>) -> Self {
        self.scenes = scenes;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Decompose every real edge of the graph.
    pub fn find_decomp(&self) -> DecompResult<Outcome> {
        let root = Component::new(self.graph.real_edges().cloned().collect(), Vec::new());
        self.solve(&root, &VertexSet::empty())
    }

    /// Cache-mediated decomposition of one component.
    pub fn solve(&self, comp: &Component, conn: &VertexSet) -> DecompResult<Outcome> {
        self.cancel.check()?;
        let permissible = self.permissible(comp);
        let scenes: Vec<Option<&DecompNode>> = comp
            .specials
            .iter()
            .map(|s| self.scenes.get(s.id).map(|n| n.as_ref()))
            .collect();
        let signature = SeparatorSignature::new(comp, conn, &permissible, &scenes, self.width);
        if let Some(outcome) = self.cache.lookup(&signature) {
            self.stats.increment(Counters::CacheHits);
            trace!(%signature, success = outcome.is_success(), "cache hit");
            return Ok(outcome);
        }
        self.stats.increment(Counters::CacheMisses);

        let outcome = self.decompose_with(comp, conn, permissible)?;
        if !outcome.is_success() {
            self.stats.increment(Counters::FailuresStored);
            debug!(%signature, "component failed at this width");
        }
        self.cache.store(signature, outcome.clone());
        Ok(outcome)
    }

    /// Decompose `comp` without consulting the cache at this level.
    pub fn decompose(&self, comp: &Component, conn: &VertexSet) -> DecompResult<Outcome> {
        let permissible = self.permissible(comp);
        self.decompose_with(comp, conn, permissible)
    }

    fn decompose_with(
        &self,
        comp: &Component,
        conn: &VertexSet,
        permissible: Vec<Edge>,
    ) -> DecompResult<Outcome> {
        if comp.is_empty() {
            return Ok(Outcome::Success(Arc::new(DecompNode::leaf(
                VertexSet::empty(),
                Vec::new(),
            ))));
        }

        // A lone scene answers for itself.
        if comp.edges.is_empty() && comp.specials.len() == 1 {
            let special = &comp.specials[0];
            return Ok(match self.scenes.get(special.id) {
                Some(scene) if conn.is_subset(&special.vertices) => {
                    self.stats.increment(Counters::SceneHits);
                    Outcome::Success(scene.clone())
                }
                _ => Outcome::Failure,
            });
        }

        // Scenes sharing no vertex with anything else hang under an empty root.
        if comp.edges.is_empty()
            && conn.is_empty()
            && comp.specials.iter().all(|s| s.vertices.is_empty())
        {
            let children = self.scene_children(&comp.specials);
            if children.len() < comp.specials.len() {
                return Ok(Outcome::Failure);
            }
            return Ok(Outcome::Success(Arc::new(DecompNode::new(
                VertexSet::empty(),
                Vec::new(),
                children,
            ))));
        }

        if !comp.edges.is_empty() && comp.edges.len() <= self.width {
            let bag = vertices_of(&comp.edges);
            if conn.is_subset(&bag) && comp.specials.iter().all(|s| s.vertices.is_subset(&bag)) {
                let children = self.scene_children(&comp.specials);
                return Ok(Outcome::Success(Arc::new(DecompNode::new(
                    bag,
                    comp.edges.clone(),
                    children,
                ))));
            }
        }

        let candidates = self.candidates(comp, permissible);
        let n = comp.len();
        let covers = (1..=self.width)
            .map(|k| binomial(candidates.len(), k))
            .fold(0usize, usize::saturating_add);
        debug!(
            vertices = %comp.vertices,
            items = n,
            candidates = candidates.len(),
            covers,
            "decomposing component"
        );

        let limit = |f: u32| {
            let f = f as usize;
            n * f.saturating_sub(1) / f.max(1)
        };
        let passes = match self.balance {
            Balance::Off => vec![Pass::Any],
            Balance::Prefer(f) => vec![Pass::Balanced(limit(f)), Pass::Unbalanced(limit(f))],
            Balance::Require(f) => vec![Pass::Balanced(limit(f))],
        };
        for pass in passes {
            if let Some(node) = self.first_success(comp, conn, &candidates, pass)? {
                return Ok(Outcome::Success(node));
            }
        }
        Ok(Outcome::Failure)
    }

    /// Graph edges touching the component.
    fn permissible(&self, comp: &Component) -> Vec<Edge> {
        self.graph
            .edges()
            .iter()
            .filter(|e| e.vertices.intersects(&comp.vertices))
            .cloned()
            .collect()
    }

    fn candidates(&self, comp: &Component, mut permissible: Vec<Edge>) -> Vec<Edge> {
        if self.local_subedges {
            let subs =
                Graph::local_subedges(&permissible, &comp.vertices, self.graph.next_edge_id());
            permissible.extend(subs);
        }
        permissible
    }

    fn scene_children(&self, specials: &[Special]) -> Vec<Arc<DecompNode>> {
        specials
            .iter()
            .filter_map(|s| self.scenes.get(s.id).cloned())
            .inspect(|_| self.stats.increment(Counters::SceneHits))
            .collect()
    }

    fn first_success(
        &self,
        comp: &Component,
        conn: &VertexSet,
        candidates: &[Edge],
        pass: Pass,
    ) -> DecompResult<Option<Arc<DecompNode>>> {
        let mut covers = CoverIter::new(candidates.len(), self.width);
        loop {
            let chunk: Vec<Vec<usize>> = covers.by_ref().take(COVER_CHUNK).collect();
            if chunk.is_empty() {
                return Ok(None);
            }
            let found = if self.parallel {
                chunk
                    .par_iter()
                    .find_map_first(|c| self.try_cover(comp, conn, candidates, c, pass))
            } else {
                chunk
                    .iter()
                    .find_map(|c| self.try_cover(comp, conn, candidates, c, pass))
            };
            if let Some(result) = found {
                return result.map(Some);
            }
        }
    }

    /// `None` when the cover is inadmissible or some sub-component fails.
    fn try_cover(
        &self,
        comp: &Component,
        conn: &VertexSet,
        candidates: &[Edge],
        indices: &[usize],
        pass: Pass,
    ) -> Option<DecompResult<Arc<DecompNode>>> {
        if let Err(e) = self.cancel.check() {
            return Some(Err(e));
        }
        self.stats.increment(Counters::CoversTried);

        let cover: Vec<Edge> = indices.iter().map(|&i| candidates[i].clone()).collect();
        let bag = vertices_of(&cover).intersection(&comp.vertices);
        if !conn.is_subset(&bag) {
            return None;
        }
        // The bag must reach past the connection, or nothing shrinks.
        if bag.difference(conn).is_empty() {
            return None;
        }
        let subs = comp.split(&bag);
        if !pass.admits(&subs) {
            return None;
        }

        let mut children = Vec::with_capacity(subs.len());
        for sub in &subs {
            let sub_conn = sub.vertices.intersection(&bag);
            match self.solve(sub, &sub_conn) {
                Ok(Outcome::Success(node)) => children.push(node),
                Ok(Outcome::Failure) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
        let covered: Vec<Special> = comp
            .specials
            .iter()
            .filter(|s| s.vertices.is_subset(&bag))
            .cloned()
            .collect();
        children.extend(self.scene_children(&covered));
        Some(Ok(Arc::new(DecompNode::new(bag, cover, children))))
    }
}
