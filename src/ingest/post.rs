//! Post parsing: tag extraction and timestamp parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Pattern matching `#tag` tokens: a `#` followed by anything up to the
/// next `#`, space, comma, period, or newline.
const TAG_PATTERN: &str = "#[^# ,.\n]+";

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TAG_PATTERN).expect("tag pattern is a valid regex"))
}

/// A single labeled event: a set of tags and the moment it was posted.
///
/// Immutable once created; windows hold their own copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Tags attached to this post (normalized, deduplicated)
    pub tags: BTreeSet<String>,
    /// Timestamp when the post was published
    pub timestamp: DateTime<Utc>,
}

impl Post {
    /// Create a post from an already-extracted tag set.
    pub fn new(tags: BTreeSet<String>, timestamp: DateTime<Utc>) -> Self {
        Self { tags, timestamp }
    }

    /// Parse a post from raw text and a date string.
    ///
    /// Tags are extracted from the lowercased text and passed through
    /// `to_label`, which lets callers coarsen the tag space (see
    /// [`first_letter`] and [`numbered_group`]).
    pub fn parse(
        text: &str,
        date: &str,
        to_label: impl Fn(&str) -> String,
    ) -> Result<Self, IngestError> {
        let lowered = text.to_lowercase();
        let tags = tag_pattern()
            .find_iter(&lowered)
            .map(|m| to_label(m.as_str()))
            .collect();
        let timestamp = parse_timestamp(date)?;
        Ok(Self { tags, timestamp })
    }
}

/// Parse a timestamp string, accepting RFC 3339 plus a few common
/// naive formats (interpreted as UTC).
fn parse_timestamp(date: &str) -> Result<DateTime<Utc>, IngestError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(date, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        if let Some(naive) = day.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(IngestError::InvalidTimestamp(date.to_string()))
}

/// Keep the tag as extracted.
pub fn identity(tag: &str) -> String {
    tag.to_string()
}

/// Collapse a tag to the first character after the `#`.
pub fn first_letter(tag: &str) -> String {
    tag.chars().nth(1).map(String::from).unwrap_or_default()
}

/// Build a mapper that buckets tags into `groups` alphabet groups by their
/// first letter. Non-alphabetic tags land in the overflow group.
pub fn numbered_group(groups: u32) -> Result<impl Fn(&str) -> String, IngestError> {
    if groups < 2 {
        return Err(IngestError::InvalidGroupCount(groups));
    }
    let group_size = 26 / (groups - 1);
    if group_size == 0 {
        return Err(IngestError::InvalidGroupCount(groups));
    }
    Ok(move |tag: &str| {
        match tag.chars().nth(1) {
            Some(c @ 'a'..='z') => {
                let n = c as u32 - 'a' as u32;
                let group_number = (n / group_size + 1).min(groups - 1);
                group_number.to_string()
            }
            _ => groups.to_string(),
        }
    })
}

/// Ingestion errors.
#[derive(Debug)]
pub enum IngestError {
    InvalidTimestamp(String),
    InvalidGroupCount(u32),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::InvalidTimestamp(s) => write!(f, "invalid timestamp: {s}"),
            IngestError::InvalidGroupCount(n) => write!(f, "invalid group count: {n}"),
        }
    }
}

impl std::error::Error for IngestError {}
