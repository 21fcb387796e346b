//! Windowed topology reporting.
//!
//! Once per window the reporter consumes the aggregator's link set and
//! appends one line to the topology log:
//!
//! ```text
//! 0-10s: Node1-Node4, Node2-Node5
//! 10-20s: none
//! ```
//!
//! Reporter firings are driven by the external engine's scheduler; the
//! firing times come from [`reporter_schedule`], an explicit finite list
//! computed once up front. Jobs never reschedule themselves, and jobs left
//! unfired at run termination are simply discarded by the engine (their
//! windows go unreported, a known truncation at the tail of a run).

use std::io::Write;

use crate::config::CorrelatorConfig;
use crate::link::Link;
use crate::types::{SimTime, WindowIndex};

/// Computes the full reporter firing list for a configuration.
///
/// One entry per window index, firing at `(index + 1) * window_length` —
/// strictly after the last timestamp that can map into the window.
///
/// # Example
///
/// ```
/// use linkscope::config::CorrelatorConfigBuilder;
/// use linkscope::report::reporter_schedule;
///
/// let config = CorrelatorConfigBuilder::new()
///     .window_length_secs(10.0)
///     .window_count(3)
///     .build()
///     .unwrap();
///
/// assert_eq!(reporter_schedule(&config), vec![(10.0, 0), (20.0, 1), (30.0, 2)]);
/// ```
pub fn reporter_schedule(config: &CorrelatorConfig) -> Vec<(SimTime, WindowIndex)> {
    (0..config.window_count)
        .map(|index| ((index + 1) as f64 * config.window_length_secs, index))
        .collect()
}

/// Append-only topology log.
pub struct TopologyReporter<W: Write> {
    writer: W,
    window_length: f64,
    windows_reported: u64,
    write_errors: u64,
}

impl<W: Write> TopologyReporter<W> {
    /// Creates a reporter over an already-open destination.
    pub fn new(writer: W, window_length_secs: f64) -> Self {
        Self {
            writer,
            window_length: window_length_secs,
            windows_reported: 0,
            write_errors: 0,
        }
    }

    /// Appends the report line for one window.
    ///
    /// The `links` are expected in canonical order, as produced by
    /// [`LinkWindowAggregator::snapshot`](crate::aggregate::LinkWindowAggregator::snapshot).
    pub fn report(&mut self, index: WindowIndex, links: &[Link]) {
        let start = index as f64 * self.window_length;
        let end = start + self.window_length;

        let body = if links.is_empty() {
            "none".to_string()
        } else {
            links
                .iter()
                .map(Link::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        match writeln!(self.writer, "{:.0}-{:.0}s: {}", start, end, body) {
            Ok(()) => {
                self.windows_reported += 1;
                tracing::info!(index, links = links.len(), "reported topology window");
            }
            Err(error) => {
                self.write_errors += 1;
                tracing::error!(%error, index, "failed to append to the topology log");
            }
        }
    }

    /// Flushes the underlying destination.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    /// Returns the number of windows reported.
    pub fn windows_reported(&self) -> u64 {
        self.windows_reported
    }

    /// Returns the number of failed appends.
    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    /// Returns a reference to the underlying destination.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}
