// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search configuration.

use crate::errors::{DecompError, DecompResult};
use serde::{Deserialize, Serialize};

/// Default balance factor; a cover is balanced when no sub-component keeps
/// more than half of the items.
pub const DEFAULT_BALANCE_FACTOR: u32 = 2;

/// How strongly the search prefers balanced separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Balance {
    /// Covers are tried purely in enumeration order.
    Off,
    /// Balanced covers first, then the remaining covers.
    Prefer(u32),
    /// Only balanced covers are tried.
    Require(u32),
}

impl Default for Balance {
    fn default() -> Self {
        Balance::Prefer(DEFAULT_BALANCE_FACTOR)
    }
}

impl Balance {
    pub fn factor(self) -> Option<u32> {
        match self {
            Balance::Off => None,
            Balance::Prefer(f) | Balance::Require(f) => Some(f),
        }
    }
}

/// Which subedges are offered to the search as cover candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubedgeMode {
    #[default]
    Off,
    /// Per-component restrictions, minted on demand.
    Local,
    /// Materialized once for the whole graph before search.
    Global,
}

/// How the width bound is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchMode {
    /// A single search at the configured width.
    #[default]
    Fixed,
    /// K = 1, 2, ... until the first success.
    Exact,
    /// Tighten K downward from a starting bound until the deadline.
    Approximate { timeout_secs: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Width bound K. In approximate mode, the starting bound (0 = ⌈m/2⌉).
    pub width: usize,
    pub balance: Balance,
    pub subedges: SubedgeMode,
    /// Run the hinge pre-pass before fresh searches.
    pub hinge: bool,
    /// Explore candidate covers on the rayon pool.
    pub parallel: bool,
    pub mode: SearchMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            width: 2,
            balance: Balance::default(),
            subedges: SubedgeMode::Off,
            hinge: false,
            parallel: true,
            mode: SearchMode::Fixed,
        }
    }
}

impl SearchConfig {
    pub fn with_width(width: usize) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    pub fn set_balance(mut self, balance: Balance) -> Self {
        self.balance = balance;
        self
    }

    pub fn set_subedges(mut self, subedges: SubedgeMode) -> Self {
        self.subedges = subedges;
        self
    }

    pub fn set_hinge(mut self, hinge: bool) -> Self {
        self.hinge = hinge;
        self
    }

    pub fn set_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn set_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reject settings no search can run with.
    ///
    /// Width 0 is allowed only in approximate mode, where it means "derive
    /// the starting bound from the graph".
    pub fn validate(&self) -> DecompResult<()> {
        let width_optional = matches!(self.mode, SearchMode::Approximate { .. });
        if self.width == 0 && !width_optional {
            return Err(DecompError::InvalidWidth(self.width));
        }
        if let Some(f) = self.balance.factor() {
            if f < 2 {
                return Err(DecompError::InvalidConfig(format!(
                    "balance factor must be at least 2, got {}",
                    f
                )));
            }
        }
        Ok(())
    }
}
