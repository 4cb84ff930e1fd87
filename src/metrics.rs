//! Aggregate evaluation of a model over a full window sequence.

use crate::core::scoring::Scorer;
use crate::core::window::Window;
use crate::model::Model;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics, Statistics};
use tracing::debug;

/// Aggregate error of one model over one window sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Median per-pair RMSE, normalized by window length
    pub med_rmse: f64,
    /// Mean per-pair RMSE, normalized by window length
    pub avg_rmse: f64,
}

/// Iterates consecutive window pairs, scoring each prediction against the
/// distribution that actually followed.
///
/// Before scoring a pair, the vocabulary is fed the first window's tags, so
/// every tag seen up to (and including) the input window counts toward the
/// error. Each pair's RMSE is divided by the window length in seconds to
/// keep results comparable across window sizes.
pub struct MetricsCalculator {
    windows: Vec<Window>,
    scorer: Scorer,
}

impl MetricsCalculator {
    pub fn new(windows: Vec<Window>) -> Self {
        Self {
            windows,
            scorer: Scorer::new(),
        }
    }

    /// Evaluate `model` over the window sequence.
    ///
    /// Returns `None` when fewer than two windows are available.
    pub fn metrics(&mut self, model: &mut dyn Model) -> Option<Metrics> {
        self.scorer.reset();

        let mut rmse = Vec::with_capacity(self.windows.len().saturating_sub(1));
        for pair in self.windows.windows(2) {
            let (first, second) = (&pair[0], &pair[1]);
            self.scorer.update(first.all_tags().map(str::to_string));
            let predicted = model.predict(first);
            let error = self.scorer.score(&predicted, &second.tags_distribution);
            rmse.push(error / first.seconds as f64);
        }
        if rmse.is_empty() {
            debug!("fewer than two windows, nothing to evaluate");
            return None;
        }

        let avg_rmse = Statistics::mean(rmse.iter());
        let mut data = Data::new(rmse);
        Some(Metrics {
            med_rmse: data.median(),
            avg_rmse,
        })
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

    #[test]
    fn test_too_few_windows_yields_none() {
        let mut calculator = MetricsCalculator::new(vec![window_with(0, &[("a", 1)])]);
        assert!(calculator.metrics(&mut Baseline).is_none());
    }

    #[test]
    fn test_baseline_on_steady_stream_is_perfect() {
        let windows: Vec<Window> = (0..5).map(|i| window_with(i, &[("a", 3)])).collect();
        let mut calculator = MetricsCalculator::new(windows);
        let metrics = calculator.metrics(&mut Baseline).unwrap();
        assert_eq!(metrics.med_rmse, 0.0);
        assert_eq!(metrics.avg_rmse, 0.0);
    }

    #[test]
    fn test_zero_model_error_matches_counts() {
        // Steady count of 4 and a single tag: every pair's RMSE is 4,
        // normalized by the 100-second window.
        let windows: Vec<Window> = (0..4).map(|i| window_with(i, &[("a", 4)])).collect();
        let mut calculator = MetricsCalculator::new(windows);
        let metrics = calculator.metrics(&mut ZeroModel).unwrap();
        assert!((metrics.med_rmse - 0.04).abs() < 1e-12);
        assert!((metrics.avg_rmse - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_baseline_beats_zero_model_on_steady_stream() {
        let windows: Vec<Window> = (0..6).map(|i| window_with(i, &[("a", 5)])).collect();
        let baseline = MetricsCalculator::new(windows.clone())
            .metrics(&mut Baseline)
            .unwrap();
        let zero = MetricsCalculator::new(windows)
            .metrics(&mut ZeroModel)
            .unwrap();
        assert!(baseline.avg_rmse < zero.avg_rmse);
    }
}
