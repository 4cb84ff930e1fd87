//! A single regression model over all tags.

use crate::core::window::{TagsDistribution, Window};
use crate::model::features::WindowHistory;
use crate::model::regression::{Regressor, StandardScaler};
use crate::model::Model;
use tracing::debug;

/// One regressor shared by every tag, fed per-tag trend feature rows.
///
/// In online mode every `predict` first performs an incremental fit step on
/// the previous window pair, so the model keeps adapting as the stream
/// advances. The feature scaler is fit once on the first training batch and
/// reused thereafter; until it exists, predictions are unavailable and an
/// empty distribution is returned.
pub struct TagModel<R: Regressor> {
    model: R,
    history: WindowHistory,
    scaler: Option<StandardScaler>,
    online: bool,
    prev_window: Option<Window>,
}

impl<R: Regressor> TagModel<R> {
    /// Create a model keeping `windows_number` windows of history.
    pub fn new(windows_number: usize, model: R, online: bool) -> Self {
        Self {
            model,
            history: WindowHistory::new(windows_number),
            scaler: None,
            online,
            prev_window: None,
        }
    }

    /// Whether the feature scaler has been fit.
    pub fn is_ready(&self) -> bool {
        self.scaler.is_some()
    }
}

impl<R: Regressor> Model for TagModel<R> {
    fn predict(&mut self, window: &Window) -> TagsDistribution {
        if self.online {
            if let Some(prev) = self.prev_window.take() {
                self.fit(&[prev, window.clone()]);
            }
        }
        self.prev_window = Some(window.clone());

        let rows = self.history.feature_rows(window);
        if rows.is_empty() {
            return TagsDistribution::new();
        }
        let Some(scaler) = &self.scaler else {
            debug!("prediction requested before any scaler fit");
            return TagsDistribution::new();
        };

        let (tags, features): (Vec<String>, Vec<Vec<f64>>) = rows.into_iter().unzip();
        let predicted = self.model.predict(&scaler.transform(&features));
        tags.into_iter()
            .zip(predicted)
            .map(|(tag, value)| (tag, value.max(0.0).round() as u32))
            .collect()
    }

    fn fit(&mut self, windows: &[Window]) {
        let remaining = if self.history.is_seeded() {
            windows
        } else {
            self.history.seed(windows)
        };

        let (rows, targets) = self.history.training_pairs(remaining);
        if rows.is_empty() {
            return;
        }
        let features: Vec<Vec<f64>> = rows.into_iter().map(|(_, x)| x).collect();
        let scaler = self
            .scaler
            .get_or_insert_with(|| StandardScaler::fit(&features));
        let scaled = scaler.transform(&features);

        if self.online {
            self.model.partial_fit(&scaled, &targets);
        } else {
            self.model.fit(&scaled, &targets);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Post;
    use crate::model::regression::SgdRegressor;
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

    /// Steady stream: "a" appears a constant 3 times per window.
    fn steady_windows(n: i64) -> Vec<Window> {
        (0..n).map(|i| window_with(i, &[("a", 3)])).collect()
    }

    #[test]
    fn test_predict_before_fit_is_empty() {
        let mut model = TagModel::new(3, SgdRegressor::default(), true);
        assert!(model.predict(&window_with(0, &[("a", 2)])).is_empty());
    }

    #[test]
    fn test_predict_without_scaler_is_empty() {
        let mut model = TagModel::new(3, SgdRegressor::default(), true);
        // Too few windows to produce a training pair: history seeds but no
        // scaler is ever fit.
        model.fit(&steady_windows(3));
        assert!(!model.is_ready());
        assert!(model.predict(&window_with(3, &[("a", 3)])).is_empty());
    }

    #[test]
    fn test_fit_then_predict_covers_present_tags() {
        let mut model = TagModel::new(3, SgdRegressor::default(), true);
        model.fit(&steady_windows(8));
        assert!(model.is_ready());

        let prediction = model.predict(&window_with(8, &[("a", 3)]));
        assert!(prediction.contains_key("a"));
        // Counts are never negative by construction of the clip
        for value in prediction.values() {
            assert!(*value < 1_000);
        }
    }

    #[test]
    fn test_offline_mode_does_not_refit_on_predict() {
        let mut offline = TagModel::new(3, SgdRegressor::default(), false);
        offline.fit(&steady_windows(8));
        let samples_before = offline.model.samples_seen();
        offline.predict(&window_with(8, &[("a", 3)]));
        offline.predict(&window_with(9, &[("a", 3)]));
        assert_eq!(offline.model.samples_seen(), samples_before);
    }

    #[test]
    fn test_online_mode_refits_between_predicts() {
        let mut online = TagModel::new(3, SgdRegressor::default(), true);
        online.fit(&steady_windows(8));
        let samples_before = online.model.samples_seen();
        online.predict(&window_with(8, &[("a", 3)]));
        // First predict has no previous window yet
        assert_eq!(online.model.samples_seen(), samples_before);
        online.predict(&window_with(9, &[("a", 3)]));
        assert!(online.model.samples_seen() > samples_before);
    }
}
