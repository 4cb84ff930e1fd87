//! Forecasting models over window sequences.
//!
//! This module contains:
//! - The `Model` and `WindowModel` capability contracts
//! - Trivial reference models (`Baseline`, `ZeroModel`)
//! - The SGD regression layer and shared feature machinery
//! - The window models (`TagModel`, `TagwiseModel`) and the `Ensemble`

pub mod ensemble;
pub mod features;
pub mod regression;
pub mod tag_model;
pub mod tagwise;

// Re-export commonly used types
pub use ensemble::{Ensemble, ModelFactory};
pub use features::{WindowHistory, FEATURE_DIM};
pub use regression::{Regressor, SgdRegressor, StandardScaler};
pub use tag_model::TagModel;
pub use tagwise::{RegressorFactory, TagwiseModel};

use crate::core::window::{TagsDistribution, Window};

/// A model trained on an ordered batch of windows that predicts the
/// next-window tag distribution from the current window.
pub trait Model {
    /// Predict each tag's count in the window following `window`.
    fn predict(&mut self, window: &Window) -> TagsDistribution;

    /// Train on an ordered sequence of windows.
    fn fit(&mut self, windows: &[Window]);
}

/// A model trained one step at a time on a window and the distribution
/// that actually followed it.
pub trait WindowModel {
    /// Predict each tag's count in the window following `window`.
    fn predict(&mut self, window: &Window) -> TagsDistribution;

    /// Train on a single window and its observed next distribution.
    fn fit(&mut self, window: &Window, distribution: &TagsDistribution);
}

/// Predicts that the next window repeats the current distribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

impl Model for Baseline {
    fn predict(&mut self, window: &Window) -> TagsDistribution {
        window.tags_distribution.clone()
    }

    fn fit(&mut self, _windows: &[Window]) {}
}

/// Predicts nothing; the floor every real model must beat.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroModel;

impl Model for ZeroModel {
    fn predict(&mut self, _window: &Window) -> TagsDistribution {
        TagsDistribution::new()
    }

    fn fit(&mut self, _windows: &[Window]) {}
}
