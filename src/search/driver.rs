// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Width drivers.
//!
//! [`SeparatorSearch`] answers "is there a decomposition of width ≤ K?".
//! The drivers here choose K:
//! - [`DetKSolver`]: one search at the configured width.
//! - [`ExactSolver`]: K = 1, 2, ... with a fresh cache each time; the first
//!   success has optimal width.
//! - [`ApproximateSolver`]: find any decomposition, then keep asking for a
//!   narrower one until that fails or the deadline passes. The best tree so
//!   far is returned on timeout.
//!
//! Every driver restores subedges and runs the correctness check before
//! handing a tree back.

use crate::cache::{CacheSnapshot, DecompositionCache, SearchProfile};
use crate::config::{SearchConfig, SearchMode, SubedgeMode};
use crate::decomp::{restore_subedges, CorrectnessChecker, Decomp, Outcome};
use crate::errors::{DecompError, DecompResult};
use crate::hinge;
use crate::hypergraph::Graph;
use crate::search::{CancelToken, SeparatorSearch, Statistics};
use crate::update::SavedScenes;
use parking_lot::Mutex;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A fresh (non-incremental) decomposition algorithm.
pub trait Algorithm {
    fn name(&self) -> &str;

    fn set_width(&mut self, width: usize);

    /// Decompose the graph the algorithm was built with.
    fn find_decomp(&self) -> DecompResult<Decomp>;

    fn find_decomp_graph(&self, graph: Arc<Graph>) -> DecompResult<Decomp>;
}

/// An algorithm that reuses scenes and a saved cache.
pub trait UpdateAlgorithm {
    fn name(&self) -> &str;

    fn set_width(&mut self, width: usize);

    fn find_decomp_update(
        &self,
        graph: Arc<Graph>,
        scenes: &SavedScenes,
        saved: Option<CacheSnapshot>,
    ) -> DecompResult<Decomp>;

    fn export_cache(&self) -> CacheSnapshot;
}

/// Turn a search outcome into a checked decomposition of `graph`.
///
/// `searched` is the graph the search drew covers from; it may carry
/// global subedges that `graph` lacks.
pub(crate) fn finish(
    outcome: Outcome,
    searched: Arc<Graph>,
    graph: Arc<Graph>,
    width: usize,
) -> DecompResult<Decomp> {
    let root = match outcome {
        Outcome::Success(root) => root,
        Outcome::Failure => return Err(DecompError::SearchExhausted { width }),
    };
    let restored = restore_subedges(&Decomp::new(root, searched, width))?;
    let decomp = Decomp::new(restored.root, graph, width);
    match CorrectnessChecker::diagnose(&decomp, &decomp.graph) {
        None => Ok(decomp),
        Some(violation) => Err(DecompError::CorrectnessViolation(violation.to_string())),
    }
}

/// The graph covers are drawn from under `subedges`. Building global
/// subedges stops early once `cancel` fires.
pub(crate) fn search_graph(
    graph: &Arc<Graph>,
    subedges: SubedgeMode,
    width: usize,
    cancel: &CancelToken,
) -> DecompResult<Arc<Graph>> {
    match subedges {
        SubedgeMode::Global => graph
            .compute_subedges_until(width, || cancel.is_cancelled())
            .map(Arc::new)
            .ok_or(DecompError::Cancelled),
        SubedgeMode::Off | SubedgeMode::Local => Ok(graph.clone()),
    }
}

/// Bounded-width search at a single K.
pub struct DetKSolver {
    graph: Arc<Graph>,
    config: SearchConfig,
    cache: DecompositionCache,
    stats: Arc<Statistics>,
    cancel: CancelToken,
}

impl DetKSolver {
    pub fn new(graph: Arc<Graph>, config: SearchConfig) -> Self {
        Self {
            graph,
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

    pub fn cache(&self) -> &DecompositionCache {
        &self.cache
    }

    pub fn export_cache(&self) -> CacheSnapshot {
        self.cache.snapshot(SearchProfile {
            balance: self.config.balance,
            subedges: self.config.subedges,
        })
    }

    /// One search at `width`, cancellable through `cancel`.
    pub fn solve_at(
        &self,
        graph: Arc<Graph>,
        width: usize,
        cancel: &CancelToken,
    ) -> DecompResult<Decomp> {
        if width == 0 {
            return Err(DecompError::InvalidWidth(width));
        }
        SearchConfig {
            width,
            ..self.config.clone()
        }
        .validate()?;
        let searched = search_graph(&graph, self.config.subedges, width, cancel)?;
        let search = SeparatorSearch::new(searched.clone(), width, &self.cache)
            .configure(&self.config)
            .with_stats(self.stats.clone())
            .with_cancel(cancel.clone());

        let mut outcome = Outcome::Failure;
        if self.config.hinge {
            let tree = hinge::partition(&searched);
            outcome = hinge::decompose_hinge(&search, &tree)?;
            if !outcome.is_success() {
                debug!(width, "hinge pieces failed, searching whole graph");
            }
        }
        if !outcome.is_success() {
            outcome = search.find_decomp()?;
        }
        self.stats.log();
        finish(outcome, searched, graph, width)
    }
}

impl Algorithm for DetKSolver {
    fn name(&self) -> &str {
        "DetK"
    }

    fn set_width(&mut self, width: usize) {
        self.config.width = width;
    }

    fn find_decomp(&self) -> DecompResult<Decomp> {
        self.find_decomp_graph(self.graph.clone())
    }

    fn find_decomp_graph(&self, graph: Arc<Graph>) -> DecompResult<Decomp> {
        self.config.validate()?;
        let decomp = self.solve_at(graph, self.config.width, &self.cancel)?;
        info!(solver = self.name(), width = decomp.width(), "decomposition found");
        Ok(decomp)
    }
}

/// Optimal width by trying K = 1, 2, ...
pub struct ExactSolver {
    inner: DetKSolver,
}

impl ExactSolver {
    pub fn new(graph: Arc<Graph>, config: SearchConfig) -> Self {
        Self {
            inner: DetKSolver::new(graph, config),
        }
    }
}

impl Algorithm for ExactSolver {
    fn name(&self) -> &str {
        "Exact"
    }

    /// Ignored: the width is what this solver computes.
    fn set_width(&mut self, _width: usize) {}

    fn find_decomp(&self) -> DecompResult<Decomp> {
        self.find_decomp_graph(self.inner.graph.clone())
    }

    fn find_decomp_graph(&self, graph: Arc<Graph>) -> DecompResult<Decomp> {
        // Every graph has a single-bag decomposition of width |E|.
        let max = graph.real_edges().count().max(1);
        for k in 1..=max {
            self.inner.cache.clear();
            match self.inner.solve_at(graph.clone(), k, &self.inner.cancel) {
                Ok(decomp) => {
                    info!(solver = self.name(), width = k, "exact width found");
                    return Ok(decomp);
                }
                Err(DecompError::SearchExhausted { .. }) => debug!(width = k, "no decomposition"),
                Err(e) => return Err(e),
            }
        }
        Err(DecompError::SearchExhausted { width: max })
    }
}

/// Anytime width minimisation under a deadline.
pub struct ApproximateSolver {
    inner: DetKSolver,
    timeout: Duration,
}

impl ApproximateSolver {
    pub fn new(graph: Arc<Graph>, config: SearchConfig, timeout: Duration) -> Self {
        Self {
            inner: DetKSolver::new(graph, config),
            timeout,
        }
    }

    /// Find some decomposition at or above `start`, then narrow it.
    fn tighten(
        &self,
        graph: &Arc<Graph>,
        start: usize,
        best: &Mutex<Option<Decomp>>,
        cancel: &CancelToken,
    ) -> DecompResult<()> {
        let max = graph.real_edges().count().max(1);
        let mut k = start.clamp(1, max);
        loop {
            match self.inner.solve_at(graph.clone(), k, cancel) {
                Ok(decomp) => {
                    k = decomp.width();
                    *best.lock() = Some(decomp);
                    break;
                }
                Err(DecompError::SearchExhausted { .. }) if k < max => k += 1,
                Err(e) => return Err(e),
            }
        }
        while k > 1 {
            match self.inner.solve_at(graph.clone(), k - 1, cancel) {
                Ok(decomp) => {
                    debug!(width = decomp.width(), "narrower decomposition found");
                    k = decomp.width();
                    *best.lock() = Some(decomp);
                }
                Err(DecompError::SearchExhausted { .. }) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl Algorithm for ApproximateSolver {
    fn name(&self) -> &str {
        "Approximate"
    }

    /// Sets the starting bound; 0 means ⌈m/2⌉.
    fn set_width(&mut self, width: usize) {
        self.inner.set_width(width);
    }

    fn find_decomp(&self) -> DecompResult<Decomp> {
        self.find_decomp_graph(self.inner.graph.clone())
    }

    fn find_decomp_graph(&self, graph: Arc<Graph>) -> DecompResult<Decomp> {
        let m = graph.real_edges().count();
        let start = match self.inner.config.width {
            0 => m.div_ceil(2),
            w => w,
        };
        SearchConfig {
            width: start.max(1),
            ..self.inner.config.clone()
        }
        .validate()?;
        let best: Mutex<Option<Decomp>> = Mutex::new(None);
        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::channel();

        let result = thread::scope(|s| {
            let (graph, best, cancel) = (&graph, &best, &cancel);
            // A worker that dies drops `tx`, ending the wait early.
            s.spawn(move || {
                let _ = tx.send(self.tighten(graph, start, best, cancel));
            });
            match rx.recv_timeout(self.timeout) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => {
                    cancel.cancel();
                    info!(timeout = ?self.timeout, "approximation timed out");
                    Err(DecompError::Cancelled)
                }
                Err(RecvTimeoutError::Disconnected) => Err(DecompError::Cancelled),
            }
        });

        match (best.into_inner(), result) {
            (Some(decomp), Ok(()) | Err(DecompError::Cancelled)) => {
                info!(solver = self.name(), width = decomp.width(), "best decomposition");
                Ok(decomp)
            }
            (None, Ok(())) => Err(DecompError::SearchExhausted { width: m }),
            (_, Err(e)) => {
                warn!(error = %e, "approximation stopped without a result");
                Err(e)
            }
        }
    }
}

/// Run the driver `config.mode` selects.
pub fn decompose_with_config(graph: Arc<Graph>, config: &SearchConfig) -> DecompResult<Decomp> {
    config.validate()?;
    match config.mode {
        SearchMode::Fixed => DetKSolver::new(graph, config.clone()).find_decomp(),
        SearchMode::Exact => ExactSolver::new(graph, config.clone()).find_decomp(),
        SearchMode::Approximate { timeout_secs } => {
            ApproximateSolver::new(graph, config.clone(), Duration::from_secs(timeout_secs))
                .find_decomp()
        }
    }
}
