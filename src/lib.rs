//! Tagtrend - tag popularity forecasting over time-windowed event streams.
//!
//! This library buckets a stream of timestamped, tagged posts into ordered
//! fixed-length time windows, extracts per-tag trend features from recent
//! window history, and predicts each tag's count in the next window with
//! regression models that can be trained incrementally as windows arrive.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Tagtrend                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────────┐   ┌───────────────────┐    │
//! │  │  Ingest  │──▶│  Windowing    │──▶│  Models           │    │
//! │  │  (posts) │   │  (time bins)  │   │  (tag regressors) │    │
//! │  └──────────┘   └───────────────┘   └───────────────────┘    │
//! │                                              │               │
//! │                                              ▼               │
//! │                                     ┌─────────────────┐      │
//! │                                     │  Scoring /      │      │
//! │                                     │  Metrics        │      │
//! │                                     └─────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tagtrend::{identity, MetricsCalculator, Post, SgdRegressor, TagModel, WindowsManager};
//! use tagtrend::model::Model;
//!
//! let posts = vec![
//!     Post::parse("launch day! #rust #release", "2024-03-01T09:00:00Z", identity).unwrap(),
//!     Post::parse("still going #rust", "2024-03-01T11:30:00Z", identity).unwrap(),
//! ];
//! let manager = WindowsManager::new(posts).expect("non-empty stream");
//! let windows = manager.windows(3600).expect("bucketing");
//!
//! let mut model = TagModel::new(3, SgdRegressor::default(), true);
//! model.fit(&windows);
//! let metrics = MetricsCalculator::new(windows).metrics(&mut model);
//! ```

pub mod config;
pub mod core;
pub mod ingest;
pub mod metrics;
pub mod model;

// Re-export key types at crate root for convenience
pub use config::{ConfigError, ForecastConfig};
pub use core::{AccumulativeScorer, Scorer, TagsDistribution, Window, WindowingError, WindowsManager};
pub use ingest::{first_letter, identity, numbered_group, IngestError, Post};
pub use metrics::{Metrics, MetricsCalculator};
pub use model::{
    Baseline, Ensemble, Model, ModelFactory, Regressor, RegressorFactory, SgdRegressor,
    StandardScaler, TagModel, TagwiseModel, WindowModel, ZeroModel,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
