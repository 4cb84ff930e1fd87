//! Per-tag trend features over a sliding history of windows.
//!
//! Both window models share this machinery: a fixed-capacity ring buffer of
//! recently consumed windows, one 9-entry feature row per tag present in
//! the window being featurized, and consecutive-pair conversion of training
//! windows into (features, next-window count) pairs.

use crate::core::window::Window;
use std::collections::VecDeque;

/// Number of entries in every per-tag feature row.
pub const FEATURE_DIM: usize = 9;

/// Guarded ratio: substitutes the numerator when the denominator is zero
/// rather than dividing by it.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        numerator
    } else {
        numerator / denominator
    }
}

/// Fixed-capacity ring buffer of the most recently consumed windows.
///
/// Seeded once from the head of the first training batch; afterwards each
/// consumed training pair pops the oldest window and pushes the one just
/// consumed, keeping the length fixed.
#[derive(Debug, Clone)]
pub struct WindowHistory {
    capacity: usize,
    buffer: VecDeque<Window>,
}

impl WindowHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Whether the buffer has been seeded with an initial batch.
    pub fn is_seeded(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Seed the buffer with up to `capacity` windows from the head of
    /// `windows`, returning the unconsumed tail.
    pub fn seed<'a>(&mut self, windows: &'a [Window]) -> &'a [Window] {
        let take = self.capacity.min(windows.len());
        self.buffer.extend(windows[..take].iter().cloned());
        &windows[take..]
    }

    /// Slide the buffer forward past `window`.
    pub fn slide(&mut self, window: &Window) {
        self.buffer.pop_front();
        self.buffer.push_back(window.clone());
    }

    /// Build one feature row per tag present in `window`.
    ///
    /// Features per tag: current count, recent-quantum count, delta and
    /// guarded ratio against the oldest buffered window's count, delta and
    /// guarded ratio of the corresponding post-share percentages, and
    /// max/min/mean of the tag's count across the buffer. Returns no rows
    /// while the history is empty.
    pub fn feature_rows(&self, window: &Window) -> Vec<(String, Vec<f64>)> {
        let Some(oldest) = self.buffer.front() else {
            return Vec::new();
        };

        let mut rows = Vec::with_capacity(window.tags_distribution.len());
        for (tag, &count) in &window.tags_distribution {
            let history: Vec<f64> = self
                .buffer
                .iter()
                .map(|w| w.tags_distribution.get(tag).copied().unwrap_or(0) as f64)
                .collect();
            let history_max = history.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let history_min = history.iter().cloned().fold(f64::INFINITY, f64::min);
            let history_mean = history.iter().sum::<f64>() / history.len() as f64;

            let count = count as f64;
            let last_count = oldest.tags_distribution.get(tag).copied().unwrap_or(0) as f64;
            let current_percentage = ratio(count, window.posts.len() as f64);
            let last_percentage = ratio(last_count, oldest.posts.len() as f64);

            rows.push((
                tag.clone(),
                vec![
                    count,
                    window.recent_tags_distribution.get(tag).copied().unwrap_or(0) as f64,
                    count - last_count,
                    ratio(count, last_count),
                    current_percentage - last_percentage,
                    ratio(current_percentage, last_percentage),
                    history_max,
                    history_min,
                    history_mean,
                ],
            ));
        }
        rows
    }

    /// Convert training windows into per-tag (features, target) pairs by
    /// sliding over consecutive window pairs.
    ///
    /// For each pair the current window is featurized, the target is the
    /// tag's count in the next window (zero when absent), and the buffer is
    /// slid past the current window.
    pub fn training_pairs(&mut self, windows: &[Window]) -> (Vec<(String, Vec<f64>)>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for pair in windows.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            for (tag, features) in self.feature_rows(current) {
                targets.push(next.tags_distribution.get(&tag).copied().unwrap_or(0) as f64);
                rows.push((tag, features));
            }
            self.slide(current);
        }
        (rows, targets)
    }
}
