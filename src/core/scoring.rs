//! Prediction error scoring over a cumulative tag vocabulary.
//!
//! Both scorers compare a predicted distribution against the actual one,
//! restricted to the set of tags observed so far. Tags never seen before a
//! scoring call do not count toward its error, so callers must feed the
//! vocabulary the *previous* window's tags before scoring a prediction.

use crate::core::window::TagsDistribution;
use std::collections::BTreeSet;

/// Root-mean-square error over a monotonically growing tag vocabulary.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    previous_tags: BTreeSet<String>,
}

impl Scorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add tags to the vocabulary.
    pub fn update<I>(&mut self, tags: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.previous_tags.extend(tags.into_iter().map(Into::into));
    }

    /// Clear the vocabulary.
    pub fn reset(&mut self) {
        self.previous_tags.clear();
    }

    /// Number of distinct tags observed so far.
    pub fn vocabulary_len(&self) -> usize {
        self.previous_tags.len()
    }

    /// RMSE between `predicted` and `actual` over the current vocabulary.
    ///
    /// Tags missing from either side count as zero; an empty vocabulary
    /// scores `0.0`.
    pub fn score(&self, predicted: &TagsDistribution, actual: &TagsDistribution) -> f64 {
        if self.previous_tags.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .previous_tags
            .iter()
            .map(|tag| {
                let p = predicted.get(tag).copied().unwrap_or(0) as f64;
                let a = actual.get(tag).copied().unwrap_or(0) as f64;
                (p - a).powi(2)
            })
            .sum();
        (sum / self.previous_tags.len() as f64).sqrt()
    }
}

/// Scorer variant that separates accumulation from reporting.
///
/// Squared errors from many window pairs flow into one running total, so a
/// single aggregate RMSE can be reported without retaining per-pair results.
#[derive(Debug, Clone, Default)]
pub struct AccumulativeScorer {
    previous_tags: BTreeSet<String>,
    error: f64,
    samples: usize,
}

impl AccumulativeScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add tags to the vocabulary.
    pub fn update<I>(&mut self, tags: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.previous_tags.extend(tags.into_iter().map(Into::into));
    }

    /// Clear the vocabulary and the running totals.
    pub fn reset(&mut self) {
        self.previous_tags.clear();
        self.error = 0.0;
        self.samples = 0;
    }

    /// Add one window pair's squared errors over the current vocabulary
    /// into the running total. A no-op while the vocabulary is empty.
    pub fn accumulate(&mut self, predicted: &TagsDistribution, actual: &TagsDistribution) {
        if self.previous_tags.is_empty() {
            return;
        }
        self.error += self
            .previous_tags
            .iter()
            .map(|tag| {
                let p = predicted.get(tag).copied().unwrap_or(0) as f64;
                let a = actual.get(tag).copied().unwrap_or(0) as f64;
                (p - a).powi(2)
            })
            .sum::<f64>();
        self.samples += self.previous_tags.len();
    }

    /// RMSE over everything accumulated so far; `0.0` before any samples.
    pub fn score(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        (self.error / self.samples as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(entries: &[(&str, u32)]) -> TagsDistribution {
        entries
            .iter()
            .map(|(tag, count)| (tag.to_string(), *count))
            .collect()
    }

    #[test]
    fn test_empty_vocabulary_scores_zero() {
        let scorer = Scorer::new();
        let d = dist(&[("a", 3)]);
        assert_eq!(scorer.score(&d, &d), 0.0);
    }

    #[test]
    fn test_identical_distributions_score_zero() {
        let mut scorer = Scorer::new();
        let d = dist(&[("a", 3), ("b", 1)]);
        scorer.update(d.keys().cloned());
        assert_eq!(scorer.score(&d, &d), 0.0);
    }

    #[test]
    fn test_score_is_rmse_over_vocabulary() {
        let mut scorer = Scorer::new();
        scorer.update(["a".to_string(), "b".to_string()]);
        let predicted = dist(&[("a", 4)]);
        let actual = dist(&[("a", 1), ("b", 4)]);
        // errors: a -> 3, b -> 4; RMSE = sqrt((9 + 16) / 2)
        let expected = (25.0_f64 / 2.0).sqrt();
        assert!((scorer.score(&predicted, &actual) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unseen_tags_are_excluded() {
        let mut scorer = Scorer::new();
        scorer.update(["a".to_string()]);
        let predicted = dist(&[("a", 2), ("brand-new", 100)]);
        let actual = dist(&[("a", 2)]);
        assert_eq!(scorer.score(&predicted, &actual), 0.0);
    }

    #[test]
    fn test_vocabulary_grows_monotonically() {
        let mut scorer = Scorer::new();
        scorer.update(["a".to_string()]);
        scorer.update(["b".to_string()]);
        scorer.update(["a".to_string()]);
        assert_eq!(scorer.vocabulary_len(), 2);
        scorer.reset();
        assert_eq!(scorer.vocabulary_len(), 0);
    }

    #[test]
    fn test_accumulative_matches_single_scorer() {
        let mut acc = AccumulativeScorer::new();
        let mut scorer = Scorer::new();
        let vocabulary = ["a".to_string(), "b".to_string()];
        acc.update(vocabulary.clone());
        scorer.update(vocabulary);

        let pairs = [
            (dist(&[("a", 1)]), dist(&[("a", 3), ("b", 1)])),
            (dist(&[("b", 5)]), dist(&[("b", 2)])),
            (dist(&[("a", 2), ("b", 2)]), dist(&[("a", 2), ("b", 2)])),
        ];
        let mut total = 0.0;
        let mut samples = 0usize;
        for (predicted, actual) in &pairs {
            acc.accumulate(predicted, actual);
            let rmse = scorer.score(predicted, actual);
            total += rmse * rmse * 2.0;
            samples += 2;
        }
        let expected = (total / samples as f64).sqrt();
        assert!((acc.score() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_accumulative_zero_before_samples() {
        let acc = AccumulativeScorer::new();
        assert_eq!(acc.score(), 0.0);
    }

    #[test]
    fn test_accumulate_skipped_while_vocabulary_empty() {
        let mut acc = AccumulativeScorer::new();
        acc.accumulate(&dist(&[("a", 9)]), &dist(&[("a", 1)]));
        assert_eq!(acc.score(), 0.0);
    }
}
