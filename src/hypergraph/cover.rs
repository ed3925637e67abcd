// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Deterministic edge-cover enumeration.
//!
//! Covers are yielded as index lists into a candidate slice:
//! all subsets of size 1, then size 2, and so on up to the width bound.
//! Within one size, subsets come in lexicographic order of their indices.
//!
//! Because the search accepts the *first* cover that works, this order is
//! also the tie-break between equally good covers: smaller covers win, and
//! among covers of one size the one using earlier edges wins.

/// Iterator over index subsets of `0..n` with sizes `1..=max_size`.
#[derive(Debug, Clone)]
pub struct CoverIter {
    n: usize,
    max_size: usize,
    current: Vec<usize>,
    started: bool,
}

impl CoverIter {
    /// Enumerate covers of at most `max_size` out of `n` candidates.
    pub fn new(n: usize, max_size: usize) -> Self {
        Self {
            n,
            max_size: max_size.min(n),
            current: Vec::new(),
            started: false,
        }
    }

    /// Advance `current` to the next subset of the same size, in place.
    /// Returns false when the size is exhausted.
    fn advance_same_size(&mut self) -> bool {
        let k = self.current.len();
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.current[i] < self.n - k + i {
                self.current[i] += 1;
                for j in i + 1..k {
                    self.current[j] = self.current[j - 1] + 1;
                }
                return true;
            }
        }
        false
    }
}

impl Iterator for CoverIter {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.max_size == 0 {
            return None;
        }
        if !self.started {
            self.started = true;
            self.current = vec![0];
            return Some(self.current.clone());
        }
        if self.advance_same_size() {
            return Some(self.current.clone());
        }
        let next_size = self.current.len() + 1;
        if next_size > self.max_size {
            return None;
        }
        self.current = (0..next_size).collect();
        Some(self.current.clone())
    }
}

/// Binomial coefficient, saturating. Used to report search effort.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: usize = 1;
    for i in 0..k {
        result = result.saturating_mul(n - i) / (i + 1);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_size_then_lexicographic() {
        let covers: Vec<Vec<usize>> = CoverIter::new(3, 2).collect();
        assert_eq!(
            covers,
            vec![
                vec![0],
                vec![1],
                vec![2],
                vec![0, 1],
                vec![0, 2],
                vec![1, 2],
            ]
        );
    }

    #[test]
    fn test_count_matches_binomials() {
        let n = 7;
        let k = 3;
        let expected: usize = (1..=k).map(|s| binomial(n, s)).sum();
        assert_eq!(CoverIter::new(n, k).count(), expected);
    }

    #[test]
    fn test_max_size_capped_by_candidates() {
        let covers: Vec<Vec<usize>> = CoverIter::new(2, 5).collect();
        assert_eq!(covers, vec![vec![0], vec![1], vec![0, 1]]);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(CoverIter::new(0, 3).count(), 0);
        assert_eq!(CoverIter::new(4, 0).count(), 0);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(5, 0), 1);
        assert_eq!(binomial(2, 3), 0);
    }
}
