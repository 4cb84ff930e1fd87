//! Fixed-span time windows over the post stream.
//!
//! A window owns the posts that fall inside its bounds and maintains two
//! tag-count distributions: one over the whole span and one over the
//! trailing "quantum" sub-interval, which captures short-term trend signal.

use crate::ingest::Post;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from tag to how many posts in a window carry it.
///
/// Ordered so feature/target pairing and prediction output are deterministic.
pub type TagsDistribution = BTreeMap<String, u32>;

/// A time window containing the posts assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Window {
    /// Start time of the window (inclusive)
    pub start: DateTime<Utc>,
    /// End time of the window (exclusive)
    pub end: DateTime<Utc>,
    /// Window length in seconds
    pub seconds: i64,
    /// Length of the trailing recent sub-interval in seconds
    pub quantum: i64,
    /// Start of the recent sub-interval (`end - quantum`)
    pub quantum_start: DateTime<Utc>,
    /// Posts assigned to this window
    pub posts: Vec<Post>,
    /// Tag counts over the whole window
    pub tags_distribution: TagsDistribution,
    /// Tag counts over the recent sub-interval only
    pub recent_tags_distribution: TagsDistribution,
}

impl Window {
    /// Create a new empty window starting at the given time.
    ///
    /// When no quantum is given it defaults to `max(seconds / 100, 1)`,
    /// i.e. one percent of the window but never less than a second.
    pub fn new(start: DateTime<Utc>, seconds: i64, quantum: Option<i64>) -> Self {
        let end = start + Duration::seconds(seconds);
        let quantum = quantum.unwrap_or_else(|| (seconds / 100).max(1));
        Self {
            start,
            end,
            seconds,
            quantum,
            quantum_start: end - Duration::seconds(quantum),
            posts: Vec::new(),
            tags_distribution: TagsDistribution::new(),
            recent_tags_distribution: TagsDistribution::new(),
        }
    }

    /// Check if a timestamp falls within this window.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    /// Add a post to this window, updating both distributions.
    ///
    /// Returns whether the post was accepted; a post outside the window
    /// bounds is rejected and leaves the window untouched.
    pub fn add_post(&mut self, post: Post) -> bool {
        if !self.contains(post.timestamp) {
            return false;
        }
        let in_quantum = post.timestamp >= self.quantum_start;
        for tag in &post.tags {
            *self.tags_distribution.entry(tag.clone()).or_insert(0) += 1;
            if in_quantum {
                *self.recent_tags_distribution.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        self.posts.push(post);
        true
    }

    /// Check if the window has any posts.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Check if any contained post carries at least one tag.
    pub fn has_tags(&self) -> bool {
        self.posts.iter().any(|p| !p.tags.is_empty())
    }

    /// Iterate over every tag occurrence in the window, in post order.
    pub fn all_tags(&self) -> impl Iterator<Item = &str> {
        self.posts
            .iter()
            .flat_map(|p| p.tags.iter().map(String::as_str))
    }
}
