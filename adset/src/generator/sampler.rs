// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Weighted random selection among siblings

use parking_lot::Mutex;

/// Picks one candidate with probability proportional to its weight.
///
/// Weights are relative: they need not sum to one. When every weight is zero
/// the first candidate is picked.
pub struct WeightedSampler {
    rng: Mutex<fastrand::Rng>,
}

impl Default for WeightedSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightedSampler {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Reproducible sequence of picks, for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }

    /// Index of the chosen candidate, `None` for an empty slice
    pub fn pick<T, F>(&self, candidates: &[T], weight: F) -> Option<usize>
    where
        F: Fn(&T) -> f64,
    {
        if candidates.is_empty() {
            return None;
        }

        let weights: Vec<f64> = candidates.iter().map(|c| weight(c).max(0.0)).collect();
        let total: f64 = weights.iter().sum();

        if total <= 0.0 {
            return Some(0);
        }

        let draw = self.rng.lock().f64() * total;
        Some(select_index(&weights, draw))
    }
}

/// First index whose running sum reaches `draw`; the last index when float
/// roundoff leaves the sum short.
fn select_index(weights: &[f64], draw: f64) -> usize {
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if cumulative >= draw {
            return index;
        }
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_index_walks_cumulative_sum() {
        let weights = [0.3, 0.7];
        assert_eq!(select_index(&weights, 0.0), 0);
        assert_eq!(select_index(&weights, 0.3), 0);
        assert_eq!(select_index(&weights, 0.31), 1);
        assert_eq!(select_index(&weights, 0.99), 1);
    }

    #[test]
    fn test_select_index_is_a_plain_cumulative_walk() {
        assert_eq!(select_index(&[0.0, 0.5], 0.0), 0);
        assert_eq!(select_index(&[0.0, 0.5], 0.01), 1);
        assert_eq!(select_index(&[0.5, 0.0, 0.5], 0.5), 0);
        assert_eq!(select_index(&[0.5, 0.0, 0.5], 0.75), 2);
    }

    #[test]
    fn test_roundoff_falls_back_to_last() {
        assert_eq!(select_index(&[0.1, 0.2], 0.3000001), 1);
    }

    #[test]
    fn test_empty_and_single_candidate() {
        let sampler = WeightedSampler::seeded(7);
        let empty: [f64; 0] = [];
        assert_eq!(sampler.pick(&empty, |w| *w), None);
        assert_eq!(sampler.pick(&[0.4], |w| *w), Some(0));
    }

    #[test]
    fn test_all_zero_weights_pick_the_first() {
        let sampler = WeightedSampler::seeded(11);
        for _ in 0..1_000 {
            assert_eq!(sampler.pick(&[0.0, 0.0, 0.0], |w| *w), Some(0));
        }
    }

    #[test]
    fn test_frequencies_follow_relative_weights() {
        let sampler = WeightedSampler::seeded(42);
        let weights = [0.3, 0.7];
        let trials = 100_000;
        let mut first = 0usize;
        for _ in 0..trials {
            if sampler.pick(&weights, |w| *w) == Some(0) {
                first += 1;
            }
        }
        let observed = first as f64 / trials as f64;
        assert!((observed - 0.3).abs() < 0.01, "observed {}", observed);
    }

    #[test]
    fn test_zero_weight_sibling_is_never_chosen() {
        let sampler = WeightedSampler::seeded(3);
        for _ in 0..1_000 {
            assert_eq!(sampler.pick(&[0.0, 0.2], |w| *w), Some(1));
        }
    }
}
