//! A rolling pool of independently trained models with a
//! challenger/incumbent replacement policy.

use crate::core::scoring::Scorer;
use crate::core::window::{TagsDistribution, Window};
use crate::model::Model;
use std::collections::BTreeMap;
use tracing::debug;

/// Factory producing a fresh untrained candidate model.
pub type ModelFactory = Box<dyn Fn() -> Box<dyn Model>>;

/// Model-of-models maintaining up to `size` trained candidates.
///
/// Each `predict` call first rolls the training window forward: the
/// incoming window joins a retained buffer of the last `train_size` windows
/// seen, and once that buffer is full a fresh candidate is trained on it.
/// While the pool is below capacity the candidate is admitted directly
/// (at most one admission per fit call); afterwards candidates queue as a
/// pending challenger which is scored against the pool on the next cycle
/// and replaces the worst-scoring incumbent when strictly better.
///
/// Predictions are the per-tag mean of the pool members' predictions,
/// rounded to the nearest count. An empty pool predicts nothing.
pub struct Ensemble {
    size: usize,
    train_size: usize,
    factory: ModelFactory,
    models: Vec<Box<dyn Model>>,
    pending: Option<Box<dyn Model>>,
    prev_windows: Vec<Window>,
    scorer: Scorer,
}

impl Ensemble {
    /// Create an ensemble holding at most `size` models, each trained on
    /// spans of `train_size` windows. The challenge phase needs
    /// `train_size >= 2`; with a shorter span candidates are still trained
    /// and admitted but never compared.
    pub fn new(size: usize, train_size: usize, factory: ModelFactory) -> Self {
        Self {
            size,
            train_size,
            factory,
            models: Vec::new(),
            pending: None,
            prev_windows: Vec::new(),
            scorer: Scorer::new(),
        }
    }

    /// Number of trained models currently in the pool.
    pub fn pool_len(&self) -> usize {
        self.models.len()
    }

    /// Whether a challenger is waiting for the next evaluation cycle.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Score the pending challenger against every pool member on the same
    /// input/target pair and replace the worst incumbent when the
    /// challenger is strictly better.
    fn challenge(&mut self, input: &Window, target: &TagsDistribution) {
        let Some(mut challenger) = self.pending.take() else {
            return;
        };
        let challenger_score = self.scorer.score(&challenger.predict(input), target);

        let mut worst: Option<(usize, f64)> = None;
        for index in 0..self.models.len() {
            let predicted = self.models[index].predict(input);
            let score = self.scorer.score(&predicted, target);
            if worst.map(|(_, s)| score > s).unwrap_or(true) {
                worst = Some((index, score));
            }
        }
        if let Some((index, score)) = worst {
            if challenger_score < score {
                debug!(challenger_score, incumbent_score = score, "challenger admitted");
                self.models[index] = challenger;
            }
        }
    }
}

impl Model for Ensemble {
    fn predict(&mut self, window: &Window) -> TagsDistribution {
        self.scorer
            .update(window.all_tags().map(str::to_string));

        self.prev_windows.push(window.clone());
        if self.prev_windows.len() > self.train_size {
            self.prev_windows.remove(0);
        }
        if self.prev_windows.len() == self.train_size {
            let runway = self.prev_windows.clone();
            self.fit(&runway);
        }

        if self.models.is_empty() {
            return TagsDistribution::new();
        }
        let mut sums: BTreeMap<String, u64> = BTreeMap::new();
        for model in &mut self.models {
            for (tag, count) in model.predict(window) {
                *sums.entry(tag).or_insert(0) += count as u64;
            }
        }
        let pool = self.models.len() as f64;
        sums.into_iter()
            .map(|(tag, sum)| (tag, (sum as f64 / pool).round() as u32))
            .collect()
    }

    fn fit(&mut self, windows: &[Window]) {
        if windows.len() >= self.train_size && self.train_size > 0 {
            for i in 0..=(windows.len() - self.train_size) {
                let span = &windows[i..i + self.train_size];
                let mut candidate = (self.factory)();
                candidate.fit(span);

                if self.models.len() < self.size {
                    self.models.push(candidate);
                    break;
                }

                if self.train_size >= 2 {
                    let input = &windows[i + self.train_size - 2];
                    let target = windows[i + self.train_size - 1].tags_distribution.clone();
                    self.challenge(input, &target);
                }
                self.pending = Some(candidate);
            }
        }

        let keep_from = windows.len().saturating_sub(self.train_size);
        self.prev_windows = windows[keep_from..].to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Post;
    use crate::model::{Baseline, ZeroModel};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn window_with(index: i64, counts: &[(&str, u32)]) -> Window {
        let mut window = Window::new(start() + Duration::seconds(index * 100), 100, None);
        for (tag, count) in counts {
            for i in 0..*count {
                let tags: BTreeSet<String> = [tag.to_string()].into_iter().collect();
                window.add_post(Post::new(tags, window.start + Duration::seconds(i as i64)));
            }
        }
        window
    }

    fn baseline_factory() -> ModelFactory {
        Box::new(|| Box::new(Baseline))
    }

    #[test]
    fn test_empty_pool_predicts_empty() {
        let mut ensemble = Ensemble::new(2, 3, baseline_factory());
        let prediction = ensemble.predict(&window_with(0, &[("a", 4)]));
        assert!(prediction.is_empty());
        assert_eq!(ensemble.pool_len(), 0);
    }

    #[test]
    fn test_pool_growth_one_admission_per_cycle() {
        let mut ensemble = Ensemble::new(2, 3, baseline_factory());

        ensemble.predict(&window_with(0, &[("a", 1)]));
        ensemble.predict(&window_with(1, &[("a", 2)]));
        assert_eq!(ensemble.pool_len(), 0);

        // First full 3-window span admits the first candidate
        ensemble.predict(&window_with(2, &[("a", 3)]));
        assert_eq!(ensemble.pool_len(), 1);

        ensemble.predict(&window_with(3, &[("a", 4)]));
        assert_eq!(ensemble.pool_len(), 2);

        // Pool at capacity: further cycles only queue challengers
        for i in 4..10 {
            ensemble.predict(&window_with(i, &[("a", 2)]));
            assert_eq!(ensemble.pool_len(), 2);
        }
        assert!(ensemble.has_pending());
    }

    #[test]
    fn test_aggregation_averages_member_predictions() {
        let mut ensemble = Ensemble::new(2, 3, baseline_factory());
        for i in 0..4 {
            ensemble.predict(&window_with(i, &[("a", 6)]));
        }
        assert_eq!(ensemble.pool_len(), 2);
        // Both Baselines echo the input distribution: mean is the count
        let prediction = ensemble.predict(&window_with(4, &[("a", 6)]));
        assert_eq!(prediction.get("a"), Some(&6));
    }

    #[test]
    fn test_better_challenger_replaces_worst_incumbent() {
        // Pool fills with ZeroModels, then the factory starts producing
        // Baselines, which score strictly better on a steady stream.
        let produced = std::cell::Cell::new(0usize);
        let factory: ModelFactory = Box::new(move || {
            let n = produced.get();
            produced.set(n + 1);
            if n < 1 {
                Box::new(ZeroModel)
            } else {
                Box::new(Baseline)
            }
        });
        let mut ensemble = Ensemble::new(1, 3, factory);

        for i in 0..3 {
            ensemble.predict(&window_with(i, &[("a", 5)]));
        }
        assert_eq!(ensemble.pool_len(), 1);
        // ZeroModel incumbent predicts nothing
        assert!(ensemble.predict(&window_with(3, &[("a", 5)])).is_empty());

        // Give the challenger a cycle to be queued and then evaluated
        for i in 4..8 {
            ensemble.predict(&window_with(i, &[("a", 5)]));
        }
        // After replacement the Baseline's echo shows through
        let prediction = ensemble.predict(&window_with(8, &[("a", 5)]));
        assert_eq!(prediction.get("a"), Some(&5));
    }

    #[test]
    fn test_fit_retains_training_runway() {
        let mut ensemble = Ensemble::new(2, 3, baseline_factory());
        let windows: Vec<Window> = (0..5).map(|i| window_with(i, &[("a", 1)])).collect();
        ensemble.fit(&windows);
        assert_eq!(ensemble.prev_windows.len(), 3);
        assert_eq!(ensemble.prev_windows[0].start, windows[2].start);
    }
}
