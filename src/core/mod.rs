//! Core functionality for the tagtrend forecaster.
//!
//! This module contains:
//! - Time-window construction and bucketing of the post stream
//! - Per-window tag count distributions
//! - Cumulative-vocabulary error scoring

pub mod scoring;
pub mod window;
pub mod windowing;

// Re-export commonly used types
pub use scoring::{AccumulativeScorer, Scorer};
pub use window::{TagsDistribution, Window};
pub use windowing::{WindowingError, WindowsManager};
