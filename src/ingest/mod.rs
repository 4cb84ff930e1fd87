//! Event ingestion for the tagtrend forecaster.
//!
//! This module turns raw post text and date strings into `Post` values:
//! `#tag` tokens are extracted and normalized, timestamps are parsed into
//! UTC datetimes. Everything downstream operates on these in-memory values.

pub mod post;

// Re-export commonly used types
pub use post::{first_letter, identity, numbered_group, IngestError, Post};
