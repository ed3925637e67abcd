// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Randomised checks over small hypergraphs.

mod common;

use common::*;
use ghd_update::search::DetKSolver;
use ghd_update::{
    Algorithm, CorrectnessChecker, Edge, Graph, SceneExtractor, SearchConfig, UpdateAlgorithm,
    UpdateOrchestrator,
};
use proptest::prelude::*;
use std::sync::Arc;

/// 1 to 6 edges, each with 1 to 4 vertices drawn from 0..8.
fn arb_edges() -> impl Strategy<Value = Vec<Vec<u32>>> {
    prop::collection::vec(prop::collection::btree_set(0u32..8, 1..=4), 1..=6)
        .prop_map(|edges| edges.into_iter().map(|e| e.into_iter().collect()).collect())
}

fn to_graph(edges: &[Vec<u32>]) -> Arc<Graph> {
    Arc::new(Graph::new(
        edges
            .iter()
            .enumerate()
            .map(|(i, vs)| Edge::new(i as u32, &format!("e{}", i), vs.iter().copied()))
            .collect(),
    ))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_every_success_is_correct(edges in arb_edges(), width in 1usize..=3) {
        let g = to_graph(&edges);
        if let Ok(decomp) = DetKSolver::new(g.clone(), SearchConfig::with_width(width)).find_decomp() {
            prop_assert!(CorrectnessChecker::check(&decomp, &g));
            prop_assert!(decomp.width() <= width);
        }
    }

    #[test]
    fn test_width_of_edge_count_always_succeeds(edges in arb_edges()) {
        let g = to_graph(&edges);
        let solver = DetKSolver::new(g.clone(), SearchConfig::with_width(edges.len()));
        prop_assert!(solver.find_decomp().is_ok());
    }

    #[test]
    fn test_parallel_matches_sequential(edges in arb_edges(), width in 1usize..=3) {
        let g = to_graph(&edges);
        let seq = DetKSolver::new(g.clone(), SearchConfig::with_width(width).set_parallel(false))
            .find_decomp()
            .map(|d| d.root);
        let par = DetKSolver::new(g, SearchConfig::with_width(width).set_parallel(true))
            .find_decomp()
            .map(|d| d.root);
        prop_assert_eq!(seq.ok(), par.ok());
    }

    #[test]
    fn test_update_agrees_with_fresh_search(
        old in arb_edges(),
        new in arb_edges(),
        width in 1usize..=3,
    ) {
        let old_graph = to_graph(&old);
        let new_graph = to_graph(&new);
        let Ok(previous) = DetKSolver::new(old_graph.clone(), SearchConfig::with_width(old.len()))
            .find_decomp()
        else {
            return Ok(());
        };
        let scenes = SceneExtractor::extract(&previous, &old_graph, &new_graph);

        let fresh = DetKSolver::new(new_graph.clone(), SearchConfig::with_width(width)).find_decomp();
        let mut orchestrator = UpdateOrchestrator::new(SearchConfig::default());
        orchestrator.set_width(width);
        let updated = orchestrator.find_decomp_update(new_graph.clone(), &scenes, None);

        // A plain search always backs the update, so it can only do better.
        if fresh.is_ok() {
            prop_assert!(updated.is_ok());
        }
        if let Ok(decomp) = updated {
            prop_assert!(CorrectnessChecker::check(&decomp, &new_graph));
            prop_assert!(decomp.width() <= width);
        }
    }
}

#[test]
fn test_common_graphs_round_out_properties() {
    // Deterministic anchor for the random cases above.
    let g = cycle(4);
    let decomp = DetKSolver::new(g.clone(), SearchConfig::with_width(2))
        .find_decomp()
        .unwrap();
    assert!(CorrectnessChecker::check(&decomp, &g));
    assert_eq!(vs(&[0, 1, 2, 3]), *g.vertices());
}
