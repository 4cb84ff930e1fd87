//! Partitioning a post stream into an ordered sequence of windows.

use crate::core::window::Window;
use crate::ingest::Post;
use chrono::{DateTime, Utc};

/// Partitions a raw post list into consecutive non-overlapping windows of a
/// configurable duration.
///
/// Windows are produced in strictly increasing start-time order. Windows
/// with no posts, or whose posts carry no tags at all, are dropped, and the
/// trailing window is discarded whenever its end exceeds the stream's
/// minimum timestamp (which in practice means always; callers relying on a
/// complete final window must extend the stream instead).
pub struct WindowsManager {
    posts: Vec<Post>,
    min_time: DateTime<Utc>,
    max_time: DateTime<Utc>,
    quantum: Option<i64>,
}

impl WindowsManager {
    /// Create a manager over a non-empty post stream.
    pub fn new(posts: Vec<Post>) -> Result<Self, WindowingError> {
        Self::with_quantum(posts, None)
    }

    /// Create a manager with an explicit recent-span override for every
    /// produced window.
    pub fn with_quantum(posts: Vec<Post>, quantum: Option<i64>) -> Result<Self, WindowingError> {
        let min_time = posts
            .iter()
            .map(|p| p.timestamp)
            .min()
            .ok_or(WindowingError::EmptyStream)?;
        let max_time = posts
            .iter()
            .map(|p| p.timestamp)
            .max()
            .ok_or(WindowingError::EmptyStream)?;
        Ok(Self {
            posts,
            min_time,
            max_time,
            quantum,
        })
    }

    /// Earliest post timestamp in the stream.
    pub fn min_time(&self) -> DateTime<Utc> {
        self.min_time
    }

    /// Latest post timestamp in the stream.
    pub fn max_time(&self) -> DateTime<Utc> {
        self.max_time
    }

    /// Bucket the stream into windows of `window_size` seconds.
    ///
    /// A post whose computed bucket rejects it signals index-arithmetic
    /// inconsistency and aborts construction with
    /// [`WindowingError::OutOfRange`].
    pub fn windows(&self, window_size: i64) -> Result<Vec<Window>, WindowingError> {
        if window_size <= 0 {
            return Err(WindowingError::InvalidWindowSize(window_size));
        }

        let mut windows = Vec::new();
        let mut current = self.min_time;
        while current <= self.max_time {
            let window = Window::new(current, window_size, self.quantum);
            current = window.end;
            windows.push(window);
        }

        for post in &self.posts {
            let offset_ms = (post.timestamp - self.min_time).num_milliseconds();
            let index = (offset_ms / (window_size * 1000)) as usize;
            let accepted = windows
                .get_mut(index)
                .map(|w| w.add_post(post.clone()))
                .unwrap_or(false);
            if !accepted {
                return Err(WindowingError::OutOfRange {
                    timestamp: post.timestamp,
                    index,
                });
            }
        }

        let mut windows: Vec<Window> = windows
            .into_iter()
            .filter(|w| !w.is_empty() && w.has_tags())
            .collect();

        // Trailing window is dropped when its end passes the stream's
        // minimum timestamp. Compared against min, not max: kept as the
        // reference behavior, pinned by tests.
        if let Some(last) = windows.last() {
            if last.end > self.min_time {
                windows.pop();
            }
        }
        Ok(windows)
    }

    /// Evenly spaced candidate window durations for hyperparameter sweeps.
    ///
    /// Candidates start at `min_size` and are bounded so the largest still
    /// yields at least `min_windows` windows over the stream's span. At
    /// most `count` candidates are produced.
    pub fn windows_sizes_range(&self, min_size: i64, count: usize, min_windows: i64) -> Vec<i64> {
        let total_seconds = (self.max_time - self.min_time).num_seconds();
        let max_size = total_seconds / min_windows.max(1);
        let divisions = (count as i64 - 1).max(1);
        let step = ((max_size - min_size) / divisions).max(1);
        (min_size..max_size).step_by(step as usize).collect()
    }
}

/// Window construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowingError {
    /// The post stream was empty
    EmptyStream,
    /// The requested window size is not a positive number of seconds
    InvalidWindowSize(i64),
    /// A post was assigned to a bucket that rejected it
    OutOfRange {
        timestamp: DateTime<Utc>,
        index: usize,
    },
}

impl std::fmt::Display for WindowingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowingError::EmptyStream => write!(f, "post stream is empty"),
            WindowingError::InvalidWindowSize(s) => {
                write!(f, "window size must be positive, got {s}")
            }
            WindowingError::OutOfRange { timestamp, index } => {
                write!(f, "post at {timestamp} rejected by window {index}")
            }
        }
    }
}

impl std::error::Error for WindowingError {}
