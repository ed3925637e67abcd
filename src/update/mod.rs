// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Incremental update.
//!
//! Given a new graph, the scenes saved from an old decomposition, and
//! optionally the old run's cache, [`UpdateOrchestrator`] builds a
//! decomposition of the new graph that reuses as much of the old one as it
//! can:
//!
//! 1. Scenes whose covers exceed K, or whose cover edges no longer exist,
//!    are dropped.
//! 2. Edges contained in a bag of a kept scene are covered by that scene and
//!    leave the search. Each scene enters the search as a *special*: the part
//!    of its vertex set still shared with the rest. A scene whose special is
//!    not inside its root bag cannot be attached and is dropped, which may
//!    return edges to the search; this repeats until stable.
//! 3. The remaining edges and specials are searched with covers drawn from
//!    the whole new graph, through a cache seeded with the saved hints.
//! 4. The result is checked against the new graph. If the scene-assisted
//!    search fails or its tree is rejected, a plain search runs before any
//!    verdict is given.

pub mod scene;

pub use scene::{EdgeDiff, SavedScenes, Scene, SceneExtractor, SceneKey};

use crate::cache::{CacheSnapshot, DecompositionCache, HintedCache, SearchProfile};
use crate::config::SearchConfig;
use crate::decomp::{CorrectnessChecker, Decomp, DecompNode};
use crate::errors::{DecompError, DecompResult};
use crate::hypergraph::{vertices_of, Component, Edge, EdgeId, Graph, Special, VertexSet};
use crate::search::driver::{finish, search_graph};
use crate::search::{CancelToken, DetKSolver, SeparatorSearch, Statistics, UpdateAlgorithm};
use std::collections::HashSet;
use std::sync::{mpsc, Arc};
use std::thread;
use tracing::{debug, info, warn};

/// The search problem left after scenes take their share.
struct Prepared {
    edges: Vec<Edge>,
    specials: Vec<Special>,
    scenes: Vec<Arc<DecompNode>>,
}

pub struct UpdateOrchestrator {
    config: SearchConfig,
    cache: DecompositionCache,
    stats: Arc<Statistics>,
    cancel: CancelToken,
}

impl UpdateOrchestrator {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            cache: DecompositionCache::new(),
            stats: Arc::new(Statistics::new()),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn stats(&self) -> &Arc<Statistics> {
        &self.stats
    }

    pub fn profile(&self) -> SearchProfile {
        SearchProfile {
            balance: self.config.balance,
            subedges: self.config.subedges,
        }
    }

    /// The previous decomposition, re-targeted at `graph`, if it is still
    /// a valid decomposition of it.
    pub fn shortcut(previous: &Decomp, graph: &Arc<Graph>) -> Option<Decomp> {
        CorrectnessChecker::check(previous, graph)
            .then(|| Decomp::new(previous.root.clone(), graph.clone(), previous.bound))
    }

    /// Shortcut, then scene extraction, then update search.
    pub fn update(
        &self,
        previous: &Decomp,
        graph: Arc<Graph>,
        saved: Option<CacheSnapshot>,
    ) -> DecompResult<Decomp> {
        if let Some(decomp) = Self::shortcut(previous, &graph) {
            info!("previous decomposition is still valid, skipping update");
            return Ok(decomp);
        }
        let scenes = SceneExtractor::extract(previous, &previous.graph, &graph);
        self.find_decomp_update(graph, &scenes, saved)
    }

    pub fn find_decomp_update(
        &self,
        graph: Arc<Graph>,
        scenes: &SavedScenes,
        saved: Option<CacheSnapshot>,
    ) -> DecompResult<Decomp> {
        self.run(graph, scenes, saved, &self.cancel)
    }

    /// Race a fresh search against the update search; the first to produce
    /// a decomposition wins and the other is cancelled.
    pub fn ensemble(
        &self,
        graph: Arc<Graph>,
        scenes: &SavedScenes,
        saved: Option<CacheSnapshot>,
    ) -> DecompResult<Decomp> {
        self.config.validate()?;
        let fresh = DetKSolver::new(graph.clone(), self.config.clone());
        let fresh_cancel = CancelToken::new();
        let update_cancel = CancelToken::new();
        let (tx, rx) = mpsc::channel();

        thread::scope(|s| {
            let (fresh, graph_ref) = (&fresh, &graph);
            let (fresh_cancel, update_cancel) = (&fresh_cancel, &update_cancel);
            // Each member owns a sender; a member that dies disconnects it.
            let fresh_tx = tx.clone();
            s.spawn(move || {
                let result = fresh.solve_at(graph_ref.clone(), self.config.width, fresh_cancel);
                let _ = fresh_tx.send(("fresh", result));
            });
            s.spawn(move || {
                let result = self.run(graph_ref.clone(), scenes, saved, update_cancel);
                let _ = tx.send(("update", result));
            });

            let mut last_error = DecompError::Cancelled;
            for _ in 0..2 {
                match rx.recv() {
                    Ok((winner, Ok(decomp))) => {
                        fresh_cancel.cancel();
                        update_cancel.cancel();
                        info!(winner, width = decomp.width(), "ensemble finished");
                        return Ok(decomp);
                    }
                    Ok((member, Err(e))) => {
                        debug!(member, error = %e, "ensemble member gave up");
                        last_error = e;
                    }
                    Err(_) => break,
                }
            }
            Err(last_error)
        })
    }

    pub fn export_cache(&self) -> CacheSnapshot {
        self.cache.snapshot(self.profile())
    }

    fn run(
        &self,
        graph: Arc<Graph>,
        scenes: &SavedScenes,
        saved: Option<CacheSnapshot>,
        cancel: &CancelToken,
    ) -> DecompResult<Decomp> {
        self.config.validate()?;
        let width = self.config.width;
        let saved = saved.unwrap_or_else(|| CacheSnapshot::new(self.profile(), Vec::new()));
        // Hints are keyed by the graph the search actually runs over.
        let searched = search_graph(&graph, self.config.subedges, width, cancel)?;
        let hinted = HintedCache::new(
            &self.cache,
            saved,
            self.profile(),
            searched.clone(),
            self.stats.clone(),
        );

        let prepared = self.prepare(&graph, scenes);
        if !prepared.scenes.is_empty() {
            let root = Component::new(prepared.edges, prepared.specials);
            let search = SeparatorSearch::new(searched.clone(), width, &hinted)
                .configure(&self.config)
                .with_stats(self.stats.clone())
                .with_cancel(cancel.clone())
                .with_scenes(prepared.scenes);
            let outcome = search.solve(&root, &VertexSet::empty())?;
            match finish(outcome, searched.clone(), graph.clone(), width) {
                Ok(decomp) => {
                    info!(
                        width = decomp.width(),
                        scene_nodes = decomp.scene_nodes(),
                        "update reused scenes"
                    );
                    self.stats.log();
                    return Ok(decomp);
                }
                Err(DecompError::SearchExhausted { .. }) => {
                    info!(width, "scene-assisted search failed, searching without scenes");
                }
                Err(DecompError::CorrectnessViolation(violation)) => {
                    warn!(%violation, "scene-assisted tree rejected, searching without scenes");
                }
                Err(e) => return Err(e),
            }
        }

        let search = SeparatorSearch::new(searched.clone(), width, &hinted)
            .configure(&self.config)
            .with_stats(self.stats.clone())
            .with_cancel(cancel.clone());
        let outcome = search.find_decomp()?;
        self.stats.log();
        finish(outcome, searched, graph, width)
    }

    fn prepare(&self, graph: &Graph, saved: &SavedScenes) -> Prepared {
        let width = self.config.width;
        let mut kept: Vec<&Scene> = saved
            .iter()
            .filter(|s| {
                if s.root.width() > width {
                    debug!(boundary = %s.boundary, "scene wider than bound dropped");
                    return false;
                }
                if !s.root.references_live_edges(graph) {
                    warn!(boundary = %s.boundary, "scene covers edges missing from graph, dropped");
                    return false;
                }
                true
            })
            .collect();

        loop {
            let owned: HashSet<EdgeId> = graph
                .real_edges()
                .filter(|e| kept.iter().any(|s| scene::contained_in(&s.root, &e.vertices)))
                .map(|e| e.id)
                .collect();
            let rest: Vec<Edge> = graph
                .real_edges()
                .filter(|e| !owned.contains(&e.id))
                .cloned()
                .collect();
            let rest_vertices = vertices_of(&rest);

            let specials: Vec<VertexSet> = kept
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let mut shared = rest_vertices.clone();
                    for (j, t) in kept.iter().enumerate() {
                        if i != j {
                            shared.union_with(&t.vertices);
                        }
                    }
                    s.vertices.intersection(&shared)
                })
                .collect();

            let attachable: Vec<bool> = kept
                .iter()
                .zip(&specials)
                .map(|(s, special)| special.is_subset(&s.root.bag))
                .collect();
            if attachable.iter().all(|&ok| ok) {
                debug!(
                    scenes = kept.len(),
                    owned = owned.len(),
                    remaining = rest.len(),
                    "scenes prepared"
                );
                return Prepared {
                    edges: rest,
                    specials: specials
                        .into_iter()
                        .enumerate()
                        .map(|(id, vertices)| Special { id, vertices })
                        .collect(),
                    scenes: kept.iter().map(|s| s.root.clone()).collect(),
                };
            }
            let mut flags = attachable.into_iter();
            kept.retain(|s| {
                let ok = flags.next().unwrap_or(false);
                if !ok {
                    debug!(boundary = %s.boundary, "scene cannot attach at its root, dropped");
                }
                ok
            });
        }
    }
}

impl UpdateAlgorithm for UpdateOrchestrator {
    fn name(&self) -> &str {
        "Update"
    }

    fn set_width(&mut self, width: usize) {
        self.config.width = width;
    }

    fn find_decomp_update(
        &self,
        graph: Arc<Graph>,
        scenes: &SavedScenes,
        saved: Option<CacheSnapshot>,
    ) -> DecompResult<Decomp> {
        UpdateOrchestrator::find_decomp_update(self, graph, scenes, saved)
    }

    fn export_cache(&self) -> CacheSnapshot {
        UpdateOrchestrator::export_cache(self)
    }
}
