//! Windowed link aggregation.
//!
//! The aggregator buckets observed links into fixed-length time windows.
//! Each window holds a *set* of links: repeated observation of the same pair
//! within one window has no additional effect, which is what keeps the
//! reported topology a set of active links rather than a multiset of events.

use std::collections::BTreeSet;

use crate::config::CorrelatorConfig;
use crate::link::Link;
use crate::types::{SimTime, WindowIndex};

/// Lifecycle of a single window.
///
/// Transitions run `Empty → Accumulating → Reported`; in the single-pass
/// configuration `Reported` is terminal and a window is never reopened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowState {
    /// No link observed yet.
    Empty,
    /// At least one link observed, not yet reported.
    Accumulating,
    /// Snapshot consumed and cleared by the reporter.
    Reported,
}

/// Statistics collected by the aggregator.
#[derive(Clone, Debug, Default)]
pub struct AggregatorStats {
    /// Links inserted into a window for the first time
    pub links_inserted: u64,
    /// Observations of a pair already present in its window
    pub duplicate_observations: u64,
    /// Observations landing in an already-reported window
    pub late_observations: u64,
}

/// Per-window accumulator of observed communication links.
///
/// Windows are indexed `0..window_count`; an observation at time `t` lands
/// in window `clamp(floor(t / window_length), 0, window_count - 1)`. The
/// clamp makes timestamps at or past the final window boundary a defined
/// outcome, not an error.
pub struct LinkWindowAggregator {
    window_length: f64,
    windows: Vec<BTreeSet<Link>>,
    states: Vec<WindowState>,
    stats: AggregatorStats,
}

impl LinkWindowAggregator {
    /// Creates an aggregator with `window_count` windows of
    /// `window_length_secs` seconds each.
    pub fn new(window_length_secs: f64, window_count: usize) -> Self {
        Self {
            window_length: window_length_secs,
            windows: vec![BTreeSet::new(); window_count],
            states: vec![WindowState::Empty; window_count],
            stats: AggregatorStats::default(),
        }
    }

    /// Creates an aggregator from a configuration value object.
    pub fn from_config(config: &CorrelatorConfig) -> Self {
        Self::new(config.window_length_secs, config.window_count)
    }

    /// Returns the number of windows.
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Returns the window length in seconds.
    pub fn window_length(&self) -> f64 {
        self.window_length
    }

    /// Computes the window index for a timestamp.
    ///
    /// # Example
    ///
    /// ```
    /// use linkscope::aggregate::LinkWindowAggregator;
    ///
    /// let agg = LinkWindowAggregator::new(10.0, 10);
    /// assert_eq!(agg.window_index(0.0), 0);
    /// assert_eq!(agg.window_index(10.0), 1);
    /// assert_eq!(agg.window_index(99.9), 9);
    /// assert_eq!(agg.window_index(1234.0), 9); // clamped
    /// ```
    pub fn window_index(&self, time: SimTime) -> WindowIndex {
        let raw = (time / self.window_length).floor();
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.windows.len().saturating_sub(1))
        }
    }

    /// Inserts a link into the window covering `time`.
    ///
    /// Insertion is idempotent within a window.
    pub fn observe(&mut self, time: SimTime, link: Link) {
        let index = self.window_index(time);
        let Some(window) = self.windows.get_mut(index) else {
            return;
        };

        if self.states[index] == WindowState::Reported {
            self.stats.late_observations += 1;
            tracing::debug!(index, %link, "observation landed in an already-reported window");
        } else {
            self.states[index] = WindowState::Accumulating;
        }

        if window.insert(link) {
            self.stats.links_inserted += 1;
        } else {
            self.stats.duplicate_observations += 1;
        }
    }

    /// Returns the links of a window in canonical `(low, high)` order.
    pub fn snapshot(&self, index: WindowIndex) -> Vec<Link> {
        self.windows
            .get(index)
            .map(|window| window.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Empties a window and marks it reported.
    pub fn clear(&mut self, index: WindowIndex) {
        if let Some(window) = self.windows.get_mut(index) {
            window.clear();
            self.states[index] = WindowState::Reported;
        }
    }

    /// Takes a window's links, clearing it in the same step.
    ///
    /// This is the snapshot-then-clear pairing the reporter relies on: the
    /// returned links reflect exactly the events whose timestamps fell
    /// inside the window.
    pub fn take(&mut self, index: WindowIndex) -> Vec<Link> {
        let links = self.snapshot(index);
        self.clear(index);
        links
    }

    /// Returns the lifecycle state of a window.
    pub fn state(&self, index: WindowIndex) -> Option<WindowState> {
        self.states.get(index).copied()
    }

    /// Returns the aggregator statistics.
    pub fn stats(&self) -> &AggregatorStats {
        &self.stats
    }

    /// Exports statistics as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "window_count": self.windows.len(),
            "window_length_secs": self.window_length,
            "links_inserted": self.stats.links_inserted,
            "duplicate_observations": self.stats.duplicate_observations,
            "late_observations": self.stats.late_observations,
        })
    }
}
