// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Fresh decomposition: separator search and the width drivers.

mod common;

use common::*;
use ghd_update::search::{ApproximateSolver, Counters, DetKSolver, ExactSolver};
use ghd_update::{
    decompose_with_config, Algorithm, Balance, CorrectnessChecker, DecompError,
    DecompositionCache, SearchConfig, SearchMode, SeparatorSearch, SubedgeMode,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn test_path_decomposes_around_middle_edge() {
    let g = path();
    let decomp = DetKSolver::new(g.clone(), SearchConfig::with_width(2))
        .find_decomp()
        .unwrap();

    assert_eq!(decomp.root.bag, vs(&[2, 3]));
    let labels: Vec<&str> = decomp.root.cover.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["b"]);
    assert_eq!(decomp.root.children.len(), 2);
    assert_eq!(decomp.root.children[0].bag, vs(&[1, 2]));
    assert_eq!(decomp.root.children[1].bag, vs(&[3, 4]));
    assert_eq!(decomp.width(), 1);
    assert!(CorrectnessChecker::check(&decomp, &g));
}

#[test]
fn test_search_is_deterministic() {
    let g = figure_eight(4);
    let first = DetKSolver::new(g.clone(), SearchConfig::with_width(2))
        .find_decomp()
        .unwrap();
    let second = DetKSolver::new(g, SearchConfig::with_width(2))
        .find_decomp()
        .unwrap();
    assert_eq!(first.root, second.root);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let g = figure_eight(5);
    let sequential = DetKSolver::new(g.clone(), SearchConfig::with_width(2).set_parallel(false))
        .find_decomp()
        .unwrap();
    let parallel = DetKSolver::new(g, SearchConfig::with_width(2).set_parallel(true))
        .find_decomp()
        .unwrap();
    assert_eq!(sequential.root, parallel.root);
}

#[test]
fn test_cycle_has_width_two() {
    let g = cycle(6);
    assert!(matches!(
        DetKSolver::new(g.clone(), SearchConfig::with_width(1)).find_decomp(),
        Err(DecompError::SearchExhausted { width: 1 })
    ));
    let decomp = ExactSolver::new(g.clone(), SearchConfig::default())
        .find_decomp()
        .unwrap();
    assert_eq!(decomp.width(), 2);
    assert!(decomp.is_correct());
}

#[test]
fn test_config_selects_driver() {
    let exact = decompose_with_config(cycle(5), &SearchConfig::default().set_mode(SearchMode::Exact))
        .unwrap();
    assert_eq!(exact.width(), 2);

    let approx = decompose_with_config(
        cycle(5),
        &SearchConfig::with_width(0).set_mode(SearchMode::Approximate { timeout_secs: 30 }),
    )
    .unwrap();
    assert_eq!(approx.width(), 2);
    assert!(approx.is_correct());
}

#[test]
fn test_subedge_modes_produce_valid_trees() {
    for mode in [SubedgeMode::Off, SubedgeMode::Local, SubedgeMode::Global] {
        let g = figure_eight(3);
        let decomp = DetKSolver::new(g.clone(), SearchConfig::with_width(2).set_subedges(mode))
            .find_decomp()
            .unwrap();
        assert!(CorrectnessChecker::check(&decomp, &g), "mode {:?}", mode);
        assert!(decomp
            .root
            .nodes()
            .iter()
            .all(|n| n.cover.iter().all(|e| !e.is_subedge())));
    }
}

#[test]
fn test_hinge_pass_matches_plain_validity() {
    let g = figure_eight(4);
    let hinged = DetKSolver::new(g.clone(), SearchConfig::with_width(2).set_hinge(true))
        .find_decomp()
        .unwrap();
    assert!(hinged.is_correct());
    assert_eq!(hinged.width(), 2);
}

#[test]
fn test_shared_cache_reuses_failures() {
    let g = cycle(5);
    let cache = DecompositionCache::new();
    let first = SeparatorSearch::new(g.clone(), 1, &cache).find_decomp().unwrap();
    assert!(!first.is_success());

    let stats = Arc::new(ghd_update::search::Statistics::new());
    let again = SeparatorSearch::new(g, 1, &cache)
        .with_stats(stats.clone())
        .find_decomp()
        .unwrap();
    assert!(!again.is_success());
    assert_eq!(stats.get(Counters::CacheHits), 1);
    assert_eq!(stats.get(Counters::CoversTried), 0);
}

#[test]
fn test_approximate_timeout_returns_best_so_far() {
    // Width 66 takes every edge of K12 as a leaf at once; narrowing from
    // there runs far longer than the deadline.
    let g = clique(12);
    let solver = ApproximateSolver::new(
        g.clone(),
        SearchConfig::with_width(66),
        Duration::from_millis(200),
    );
    let started = Instant::now();
    let decomp = solver.find_decomp().unwrap();
    assert!(started.elapsed() < Duration::from_secs(30));
    assert!(decomp.width() <= 66);
    assert!(CorrectnessChecker::check(&decomp, &g));
}

#[test]
fn test_approximate_rejects_bad_balance_factor() {
    let config = SearchConfig::with_width(2).set_balance(Balance::Prefer(0));
    let solver = ApproximateSolver::new(cycle(4), config, Duration::from_secs(5));
    assert!(matches!(solver.find_decomp(), Err(DecompError::InvalidConfig(_))));

    let config = SearchConfig::with_width(2).set_balance(Balance::Require(1));
    let solver = DetKSolver::new(cycle(4), config);
    assert!(matches!(solver.find_decomp(), Err(DecompError::InvalidConfig(_))));
}
