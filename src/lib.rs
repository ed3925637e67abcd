// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Bounded-width generalized hypertree decompositions, with incremental
//! update after the hypergraph changes.
//!
//! # Architecture
//!
//! The crate is organised in layers:
//!
//! ## Model
//!
//! - [`hypergraph`]: vertices, bitset vertex sets, edges and subedges,
//!   graphs, component splitting, and the fixed cover enumeration order.
//! - [`decomp`]: decomposition trees, the correctness checker, and
//!   restoration of subedge covers to original edges.
//!
//! ## Search
//!
//! - [`search`]: the separator search at a fixed width K, plus drivers that
//!   choose K (fixed, exact, approximate).
//! - [`cache`]: the concurrent signature → outcome memo shared by all
//!   branches, and its JSON snapshot.
//! - [`hinge`]: an optional pre-pass splitting the graph at hinge edges.
//!
//! ## Update
//!
//! - [`update`]: scene extraction from an old tree and the orchestrator that
//!   searches only what an edit disturbed.
//!
//! # Parallelism
//!
//! Candidate covers and hinge pieces run on the rayon pool. The cache is a
//! `DashMap`, statistics are atomic, and trees are shared through `Arc`, so
//! branches never copy each other's results. Ensemble and approximate runs
//! use scoped threads with a cancellation token.
//!
//! # References
//!
//! - Gottlob, Leone, Scarcello. "Hypertree decompositions and tractable
//!   queries." JCSS 64(3), 2002.
//! - Gottlob, Okulmus, Pichler. "Fast and parallel decomposition of
//!   constraint satisfaction problems." IJCAI 2020.

pub mod cache;
pub mod config;
pub mod decomp;
pub mod errors;
pub mod hinge;
pub mod hypergraph;
pub mod logging;
pub mod search;
pub mod update;

// Re-export commonly used types
pub use cache::{CacheHandle, CacheSnapshot, DecompositionCache, SeparatorSignature};
pub use config::{Balance, SearchConfig, SearchMode, SubedgeMode};
pub use decomp::{CorrectnessChecker, Decomp, DecompNode, Outcome};
pub use errors::{DecompError, DecompResult};
pub use hypergraph::{Edge, EdgeId, Graph, Vertex, VertexSet};
pub use search::{decompose_with_config, Algorithm, SeparatorSearch, UpdateAlgorithm};
pub use update::{SavedScenes, SceneExtractor, UpdateOrchestrator};
