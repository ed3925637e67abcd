// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for decomposition search and update.
//!
//! Search failure at a given width is *not* an error: it is the
//! [`Outcome::Failure`](crate::decomp::Outcome) value threaded through the
//! recursion. The variants here are what escapes to callers.

use thiserror::Error;

/// Result type alias using `DecompError`.
pub type DecompResult<T> = std::result::Result<T, DecompError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecompError {
    /// Width bound below 1, rejected before any search starts.
    #[error("width must be at least 1, got {0}")]
    InvalidWidth(usize),

    /// A configuration value that cannot drive a search.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No cover succeeded at this width.
    #[error("no decomposition of width {width} found")]
    SearchExhausted { width: usize },

    /// Expanding a tree back into the original edge space failed. Fatal.
    #[error("restoration failed: {0}")]
    RestorationFailure(String),

    /// The final tree did not pass the correctness check.
    #[error("decomposition failed correctness check: {0}")]
    CorrectnessViolation(String),

    /// A persisted cache snapshot could not be read. Fatal.
    #[error("malformed cache snapshot: {0}")]
    MalformedCache(#[from] serde_json::Error),

    /// The search was cancelled (lost an ensemble race, or timed out).
    #[error("search cancelled")]
    Cancelled,
}

impl DecompError {
    /// True for the errors that must abort a run rather than be recovered.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DecompError::RestorationFailure(_) | DecompError::MalformedCache(_)
        )
    }
}
