// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Cache soundness and snapshot handling.

mod common;

use common::*;
use ghd_update::cache::HintedCache;
use ghd_update::search::{Counters, DetKSolver, Statistics};
use ghd_update::{
    Algorithm, CacheHandle, CacheSnapshot, CorrectnessChecker, DecompError, DecompositionCache,
    Edge, Graph, Outcome, SearchConfig, SeparatorSearch,
};
use std::sync::Arc;

/// Every stored success decomposes exactly the sub-problem its signature names.
fn assert_sound(graph: &Graph, snapshot: &CacheSnapshot) {
    for record in &snapshot.records {
        let Outcome::Success(node) = &record.outcome else {
            continue;
        };
        let sig = &record.signature;
        let edges: Vec<Edge> = sig
            .edges
            .iter()
            .map(|&id| graph.edge(id).cloned().unwrap())
            .collect();
        assert!(
            CorrectnessChecker::check_component(node, graph, &edges, &sig.connection, sig.width),
            "unsound entry {}",
            sig
        );
        assert!(sig.connection.is_subset(&node.bag));
    }
}

#[test]
fn test_cache_entries_are_sound() {
    for g in [path(), cycle(6), figure_eight(4)] {
        let solver = DetKSolver::new(g.clone(), SearchConfig::with_width(2));
        solver.find_decomp().unwrap();
        let snapshot = solver.export_cache();
        assert!(!snapshot.is_empty());
        assert_sound(&g, &snapshot);
    }
}

#[test]
fn test_failures_are_cached_too() {
    let g = cycle(6);
    let solver = DetKSolver::new(g, SearchConfig::with_width(1));
    assert!(solver.find_decomp().is_err());
    let snapshot = solver.export_cache();
    assert!(snapshot
        .records
        .iter()
        .any(|r| r.outcome == Outcome::Failure));
}

#[test]
fn test_snapshot_json_round_trip() {
    let solver = DetKSolver::new(figure_eight(3), SearchConfig::with_width(2));
    solver.find_decomp().unwrap();
    let snapshot = solver.export_cache();
    let text = snapshot.to_json().unwrap();
    let back = CacheSnapshot::from_json(&text).unwrap();
    assert_eq!(back, snapshot);

    let restored = DecompositionCache::from_snapshot(back);
    assert_eq!(restored.len(), snapshot.len());
    for record in &snapshot.records {
        assert_eq!(restored.lookup(&record.signature), Some(record.outcome.clone()));
    }
}

#[test]
fn test_malformed_snapshot_is_rejected() {
    for text in ["", "{", "[1,2,3]", "{\"profile\": 7}"] {
        assert!(matches!(
            CacheSnapshot::from_json(text),
            Err(DecompError::MalformedCache(_))
        ));
    }
}

#[test]
fn test_hints_for_removed_edges_are_pruned() {
    let solver = DetKSolver::new(path(), SearchConfig::with_width(2));
    solver.find_decomp().unwrap();
    let snapshot = solver.export_cache();
    let total = snapshot.len();

    // Edge c (id 2) is gone from the new graph.
    let new_graph = path_with_c_replaced();
    let live = DecompositionCache::new();
    let stats = Arc::new(Statistics::new());
    let hinted = HintedCache::new(
        &live,
        snapshot.clone(),
        snapshot.profile,
        new_graph.clone(),
        stats.clone(),
    );
    let pruned = stats.get(Counters::StaleEntries) as usize;
    assert!(pruned > 0);
    assert_eq!(hinted.pending_hints() + pruned, total);

    // Searching through the hinted cache still yields a correct tree.
    let outcome = SeparatorSearch::new(new_graph.clone(), 2, &hinted)
        .with_stats(stats)
        .find_decomp()
        .unwrap();
    assert!(outcome.is_success());
}

#[test]
fn test_hinted_search_matches_fresh_search() {
    let g = figure_eight(4);
    let first = DetKSolver::new(g.clone(), SearchConfig::with_width(2));
    let fresh = first.find_decomp().unwrap();

    let live = DecompositionCache::new();
    let stats = Arc::new(Statistics::new());
    let snapshot = first.export_cache();
    let hinted = HintedCache::new(&live, snapshot.clone(), snapshot.profile, g.clone(), stats.clone());
    let outcome = SeparatorSearch::new(g, 2, &hinted)
        .with_stats(stats.clone())
        .find_decomp()
        .unwrap();

    assert_eq!(outcome.node(), Some(&fresh.root));
    assert_eq!(stats.get(Counters::CacheHits), 1);
    assert_eq!(stats.get(Counters::CoversTried), 0);
}
