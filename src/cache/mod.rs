// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Decomposition cache.
//!
//! Maps a [`SeparatorSignature`] to the [`Outcome`] of decomposing that
//! sub-problem. The cache is shared by every branch of a search, so the map
//! is a `DashMap` and stores are idempotent: whichever branch stores first
//! wins, and equal signatures always carry equal outcomes anyway.
//!
//! The search only sees a [`CacheHandle`]. During an update it is handed a
//! [`HintedCache`], which layers a saved snapshot under the live map and
//! checks every saved entry against the new graph before trusting it.

pub mod signature;
pub mod snapshot;

pub use signature::SeparatorSignature;
pub use snapshot::{CacheRecord, CacheSnapshot, SearchProfile};

use crate::decomp::Outcome;
use crate::hypergraph::Graph;
use crate::search::statistics::{Counters, Statistics};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// The cache operations the search depends on.
pub trait CacheHandle: Send + Sync {
    fn lookup(&self, signature: &SeparatorSignature) -> Option<Outcome>;

    /// Record an outcome. Storing a signature twice keeps the first outcome.
    fn store(&self, signature: SeparatorSignature, outcome: Outcome);
}

#[derive(Debug, Default)]
pub struct DecompositionCache {
    entries: DashMap<SeparatorSignature, Outcome>,
}

impl DecompositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Copy out every entry, sorted by signature.
    pub fn snapshot(&self, profile: SearchProfile) -> CacheSnapshot {
        let records = self
            .entries
            .iter()
            .map(|entry| CacheRecord {
                signature: entry.key().clone(),
                outcome: entry.value().clone(),
            })
            .collect();
        CacheSnapshot::new(profile, records)
    }

    /// Rebuild a cache from a snapshot, trusting every entry.
    pub fn from_snapshot(snapshot: CacheSnapshot) -> Self {
        let cache = Self::new();
        for record in snapshot.records {
            cache.store(record.signature, record.outcome);
        }
        cache
    }
}

impl CacheHandle for DecompositionCache {
    fn lookup(&self, signature: &SeparatorSignature) -> Option<Outcome> {
        self.entries.get(signature).map(|entry| entry.value().clone())
    }

    fn store(&self, signature: SeparatorSignature, outcome: Outcome) {
        self.entries.entry(signature).or_insert(outcome);
    }
}

/// A live cache backed by saved hints from an earlier run.
///
/// Hints whose signature mentions an edge id absent from the new graph are
/// pruned up front. The remaining hints are checked lazily: on first lookup,
/// a hint is promoted into the live cache only if every cover edge it
/// references still resolves in the new graph.
pub struct HintedCache<'a> {
    live: &'a DecompositionCache,
    hints: DashMap<SeparatorSignature, Outcome>,
    graph: Arc<Graph>,
    stats: Arc<Statistics>,
}

impl<'a> HintedCache<'a> {
    pub fn new(
        live: &'a DecompositionCache,
        snapshot: CacheSnapshot,
        expected: SearchProfile,
        graph: Arc<Graph>,
        stats: Arc<Statistics>,
    ) -> Self {
        let hints = DashMap::new();
        if snapshot.profile != expected {
            warn!(
                saved = ?snapshot.profile,
                expected = ?expected,
                records = snapshot.len(),
                "discarding cache snapshot built under a different profile"
            );
        } else {
            let mut pruned = 0u64;
            for record in snapshot.records {
                if record.signature.edge_ids().all(|id| graph.edge(id).is_some()) {
                    hints.insert(record.signature, record.outcome);
                } else {
                    pruned += 1;
                }
            }
            if pruned > 0 {
                debug!(pruned, kept = hints.len(), "pruned stale cache hints");
                stats.add(Counters::StaleEntries, pruned);
            }
        }
        Self {
            live,
            hints,
            graph,
            stats,
        }
    }

    /// Hints not yet consulted.
    pub fn pending_hints(&self) -> usize {
        self.hints.len()
    }
}

impl CacheHandle for HintedCache<'_> {
    fn lookup(&self, signature: &SeparatorSignature) -> Option<Outcome> {
        if let Some(outcome) = self.live.lookup(signature) {
            return Some(outcome);
        }
        let (signature, outcome) = self.hints.remove(signature)?;
        if outcome.references_live_edges(&self.graph) {
            self.live.store(signature, outcome.clone());
            Some(outcome)
        } else {
            debug!(%signature, "stale cache hint rejected");
            self.stats.increment(Counters::StaleEntries);
            None
        }
    }

    fn store(&self, signature: SeparatorSignature, outcome: Outcome) {
        self.live.store(signature, outcome);
    }
}
