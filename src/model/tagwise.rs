//! One independent regression model per tag.

use crate::core::window::{TagsDistribution, Window};
use crate::model::features::WindowHistory;
use crate::model::regression::{Regressor, StandardScaler};
use crate::model::Model;
use std::collections::BTreeMap;
use tracing::debug;

/// Factory producing a fresh regressor for a newly seen tag.
pub type RegressorFactory = Box<dyn Fn() -> Box<dyn Regressor>>;

/// Ensemble-per-tag variant of the window model: each tag gets its own
/// regressor, created lazily the first time the tag shows up in training.
/// The feature scaler is shared and fit once, globally, across all tags.
///
/// The per-tag registry grows monotonically with the distinct tags seen and
/// is never pruned.
pub struct TagwiseModel {
    factory: RegressorFactory,
    models: BTreeMap<String, Box<dyn Regressor>>,
    history: WindowHistory,
    scaler: Option<StandardScaler>,
}

impl TagwiseModel {
    /// Create a model keeping `windows_number` windows of history.
    pub fn new(windows_number: usize, factory: RegressorFactory) -> Self {
        Self {
            factory,
            models: BTreeMap::new(),
            history: WindowHistory::new(windows_number),
            scaler: None,
        }
    }

    /// Number of tags with a trained model.
    pub fn trained_tags(&self) -> usize {
        self.models.len()
    }
}

impl Model for TagwiseModel {
    /// Predicts only for tags that already have a trained model; tags with
    /// no history are omitted from the result, not defaulted to zero.
    fn predict(&mut self, window: &Window) -> TagsDistribution {
        let rows = self.history.feature_rows(window);
        if rows.is_empty() {
            return TagsDistribution::new();
        }
        let Some(scaler) = &self.scaler else {
            debug!("prediction requested before any scaler fit");
            return TagsDistribution::new();
        };

        rows.into_iter()
            .filter_map(|(tag, features)| {
                let model = self.models.get(&tag)?;
                let predicted = model.predict(&[scaler.transform_one(&features)]);
                let value = predicted.first().copied().unwrap_or(0.0);
                Some((tag, value.max(0.0).round() as u32))
            })
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
        let scaler = self.scaler.get_or_insert_with(|| {
            let features: Vec<Vec<f64>> = rows.iter().map(|(_, x)| x.clone()).collect();
            StandardScaler::fit(&features)
        });

        let factory = &self.factory;
        for ((tag, features), target) in rows.into_iter().zip(targets) {
            let model = self.models.entry(tag).or_insert_with(|| factory());
            model.partial_fit(&[scaler.transform_one(&features)], &[target]);
        }
    }
}
