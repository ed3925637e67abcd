// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Persisted cache snapshots.
//!
//! A snapshot is the full entry set of a cache, sorted by signature, plus the
//! search profile it was built under. Outcomes depend on the balance policy
//! and subedge mode, so hints from a different profile are not reusable.

use crate::cache::SeparatorSignature;
use crate::config::{Balance, SubedgeMode};
use crate::decomp::Outcome;
use crate::errors::DecompResult;
use serde::{Deserialize, Serialize};

/// The settings an outcome depends on besides its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchProfile {
    pub balance: Balance,
    pub subedges: SubedgeMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub signature: SeparatorSignature,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub profile: SearchProfile,
    pub records: Vec<CacheRecord>,
}

impl CacheSnapshot {
    pub fn new(profile: SearchProfile, mut records: Vec<CacheRecord>) -> Self {
        records.sort_by(|a, b| a.signature.cmp(&b.signature));
        Self { profile, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> DecompResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a snapshot. Anything unreadable is `MalformedCache`.
    pub fn from_json(text: &str) -> DecompResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DecompError;

    #[test]
    fn test_empty_round_trip() {
        let snapshot = CacheSnapshot::default();
        let back = CacheSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(back, snapshot);
        assert!(back.is_empty());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = CacheSnapshot::from_json("{\"profile\": 7").unwrap_err();
        assert!(matches!(err, DecompError::MalformedCache(_)));
        assert!(err.is_fatal());
    }
}
