//! Transmission logging.
//!
//! One structured line is appended per classified event. The timestamp is
//! fixed-precision so repeated runs diff cleanly. Logging is a pure side
//! effect: a failed append is counted and traced, never propagated into the
//! event-processing path.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::event::{Direction, TransmissionEvent, TransmissionKind};

/// Event-type label vocabulary for the transmission log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogVocabulary {
    /// `Tx Data` / `Tx Ack` / `Rx Data` / `Rx Ack`.
    #[default]
    Directional,
    /// `DATA` / `ACK` / `ACK_RECEIVED`.
    Compact,
}

impl LogVocabulary {
    /// Returns the label for a classified event.
    ///
    /// # Example
    ///
    /// ```
    /// use linkscope::event::{Direction, TransmissionKind};
    /// use linkscope::logger::LogVocabulary;
    ///
    /// let label = LogVocabulary::Directional
    ///     .label(TransmissionKind::Data, Direction::Outbound);
    /// assert_eq!(label, "Tx Data");
    /// ```
    pub fn label(&self, kind: TransmissionKind, direction: Direction) -> &'static str {
        match self {
            LogVocabulary::Directional => match (direction, kind) {
                (Direction::Outbound, TransmissionKind::Data) => "Tx Data",
                (Direction::Outbound, TransmissionKind::Ack) => "Tx Ack",
                (Direction::Inbound, TransmissionKind::Data) => "Rx Data",
                (Direction::Inbound, TransmissionKind::Ack) => "Rx Ack",
            },
            LogVocabulary::Compact => match (direction, kind) {
                (_, TransmissionKind::Data) => "DATA",
                (Direction::Outbound, TransmissionKind::Ack) => "ACK",
                (Direction::Inbound, TransmissionKind::Ack) => "ACK_RECEIVED",
            },
        }
    }
}

/// Append-only transmission log.
///
/// Each record is one line: `<time with three decimals>s Node<id> <label>`.
pub struct TransmissionLogger<W: Write> {
    writer: W,
    vocabulary: LogVocabulary,
    records_written: u64,
    write_errors: u64,
}

impl<W: Write> TransmissionLogger<W> {
    /// Creates a logger over an already-open destination.
    pub fn new(writer: W, vocabulary: LogVocabulary) -> Self {
        Self {
            writer,
            vocabulary,
            records_written: 0,
            write_errors: 0,
        }
    }

    /// Appends one record for a classified event.
    pub fn record(&mut self, event: &TransmissionEvent) {
        let label = self.vocabulary.label(event.kind, event.direction);
        match writeln!(self.writer, "{:.3}s Node{} {}", event.time, event.node, label) {
            Ok(()) => self.records_written += 1,
            Err(error) => {
                self.write_errors += 1;
                tracing::error!(%error, "failed to append to the transmission log");
            }
        }
    }

    /// Flushes the underlying destination.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    /// Returns the number of records written.
    pub fn records_written(&self) -> u64 {
        self.records_written
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
