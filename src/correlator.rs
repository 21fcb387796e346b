//! The trace correlator (coordinator).
//!
//! `TraceCorrelator` is the explicit context object owned by the surrounding
//! driver: it holds the address registry, the classifier, the window
//! aggregator, and both log destinations, and it is passed by reference into
//! each engine callback. There is no hidden shared state.
//!
//! The external engine delivers packet events and reporter firings as a
//! totally ordered sequence of callbacks keyed by simulated time. Every
//! handler here runs to completion before the next callback is dispatched,
//! so the correlator mutates its state in place without locking.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::aggregate::LinkWindowAggregator;
use crate::classify::PacketClassifier;
use crate::config::{ConfigError, CorrelatorConfig};
use crate::event::RawPacketEvent;
use crate::logger::TransmissionLogger;
use crate::registry::{AddressRegistry, RegistryError};
use crate::report::{reporter_schedule, TopologyReporter};
use crate::resolve::{resolve_peer, PeerResolution};
use crate::types::{SimTime, WindowIndex};

/// Errors that abort startup before any event is processed.
///
/// Per-event outcomes (discards, unresolved peers) are never errors; only
/// setup faults terminate the run.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("failed to open output destination: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Statistics collected by the correlator.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CorrelatorStats {
    /// Raw observations delivered by the engine
    pub events_seen: u64,
    /// Observations classified into transmission events
    pub events_classified: u64,
    /// Observations discarded by the classifier
    pub events_discarded: u64,
    /// Classified events whose peer address missed the registry
    pub unresolved_peers: u64,
    /// Classified events whose peer resolved to the observing node
    pub self_peers: u64,
    /// Events that produced a link observation
    pub links_observed: u64,
    /// Windows reported so far
    pub windows_reported: u64,
}

/// The trace-correlation and windowed-topology-reconstruction engine.
///
/// # Example
///
/// ```
/// use linkscope::correlator::TraceCorrelator;
/// use linkscope::config::CorrelatorConfig;
/// use linkscope::event::{Direction, RawPacketEvent};
/// use linkscope::registry::AddressRegistry;
/// use linkscope::types::Address;
///
/// let registry = AddressRegistry::from_assignments([
///     (Address::from([10, 0, 0, 1]), 0),
///     (Address::from([10, 0, 0, 2]), 1),
/// ])
/// .unwrap();
///
/// let mut correlator: TraceCorrelator<Vec<u8>, Vec<u8>> = TraceCorrelator::new(
///     CorrelatorConfig::default(),
///     registry,
///     Vec::new(), // transmission log
///     Vec::new(), // topology log
/// )
/// .unwrap();
///
/// correlator.handle_packet(&RawPacketEvent::endpoints(
///     2.0,
///     0,
///     Direction::Outbound,
///     Address::from([10, 0, 0, 1]),
///     Address::from([10, 0, 0, 2]),
///     512,
///     false,
/// ));
/// correlator.report_window(0);
///
/// assert_eq!(correlator.stats().links_observed, 1);
/// ```
pub struct TraceCorrelator<T: Write, P: Write> {
    config: CorrelatorConfig,
    registry: AddressRegistry,
    classifier: PacketClassifier,
    aggregator: LinkWindowAggregator,
    logger: TransmissionLogger<T>,
    reporter: TopologyReporter<P>,
    stats: CorrelatorStats,
}

impl<T: Write, P: Write> TraceCorrelator<T, P> {
    /// Creates a correlator over already-open log destinations.
    ///
    /// # Arguments
    /// * `config` - Validated at construction; invalid values are a setup fault
    /// * `registry` - The frozen address registry built at setup
    /// * `transmission_writer` - Destination for the transmission log
    /// * `topology_writer` - Destination for the topology log
    pub fn new(
        config: CorrelatorConfig,
        registry: AddressRegistry,
        transmission_writer: T,
        topology_writer: P,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        Ok(Self {
            classifier: PacketClassifier::new(config.transport_protocol),
            aggregator: LinkWindowAggregator::from_config(&config),
            logger: TransmissionLogger::new(transmission_writer, config.vocabulary),
            reporter: TopologyReporter::new(topology_writer, config.window_length_secs),
            config,
            registry,
            stats: CorrelatorStats::default(),
        })
    }

    /// Handles one raw packet observation.
    ///
    /// Classifies the observation, appends a transmission-log record, and —
    /// when the peer resolves to a distinct node — inserts the link into the
    /// current window. Discards and unresolved peers are handled entirely
    /// here; nothing surfaces to the caller.
    pub fn handle_packet(&mut self, raw: &RawPacketEvent) {
        self.stats.events_seen += 1;

        let Some(event) = self.classifier.classify(raw) else {
            self.stats.events_discarded += 1;
            return;
        };
        self.stats.events_classified += 1;

        self.logger.record(&event);

        match resolve_peer(&event, &self.registry) {
            PeerResolution::Link(link) => {
                self.aggregator.observe(event.time, link);
                self.stats.links_observed += 1;
            }
            PeerResolution::UnknownPeer => self.stats.unresolved_peers += 1,
            PeerResolution::SelfPeer => self.stats.self_peers += 1,
        }
    }

    /// Fires the topology report for one window.
    ///
    /// Takes the window's link snapshot and clears it in the same step, so
    /// the emitted line reflects exactly the events whose timestamps fell
    /// inside that window. One-shot per index in the single-pass
    /// configuration.
    pub fn report_window(&mut self, index: WindowIndex) {
        let links = self.aggregator.take(index);
        self.reporter.report(index, &links);
        self.stats.windows_reported += 1;
    }

    /// Returns the reporter firing list for this configuration.
    ///
    /// The external engine's scheduler walks this list, invoking
    /// [`report_window`](Self::report_window) with the given index at each
    /// fire time.
    pub fn reporter_schedule(&self) -> Vec<(SimTime, WindowIndex)> {
        reporter_schedule(&self.config)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    /// Returns the address registry.
    pub fn registry(&self) -> &AddressRegistry {
        &self.registry
    }

    /// Returns the window aggregator.
    pub fn aggregator(&self) -> &LinkWindowAggregator {
        &self.aggregator
    }

    /// Returns the correlator statistics.
    pub fn stats(&self) -> &CorrelatorStats {
        &self.stats
    }

    /// Exports statistics from the correlator and its subsystems.
    pub fn export_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "correlator": &self.stats,
            "aggregator": self.aggregator.export_stats(),
            "logs": {
                "transmission_records": self.logger.records_written(),
                "transmission_write_errors": self.logger.write_errors(),
                "topology_windows": self.reporter.windows_reported(),
                "topology_write_errors": self.reporter.write_errors(),
            },
        })
    }

    /// Flushes both log destinations.
    ///
    /// Typically called once at run termination, after the engine has
    /// dispatched its last callback.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.logger.flush()?;
        self.reporter.flush()
    }

    /// Returns a reference to the transmission-log destination.
    pub fn transmission_log(&self) -> &T {
        self.logger.get_ref()
    }

    /// Returns a reference to the topology-log destination.
    pub fn topology_log(&self) -> &P {
        self.reporter.get_ref()
    }
}

impl TraceCorrelator<BufWriter<File>, BufWriter<File>> {
    /// Creates a correlator writing to files, created at setup.
    ///
    /// Failure to open either destination is a fatal setup fault; no event
    /// is processed against a half-open correlator.
    pub fn open(
        config: CorrelatorConfig,
        registry: AddressRegistry,
        transmission_path: impl AsRef<Path>,
        topology_path: impl AsRef<Path>,
    ) -> Result<Self, SetupError> {
        let transmission = BufWriter::new(File::create(transmission_path)?);
        let topology = BufWriter::new(File::create(topology_path)?);
        Self::new(config, registry, transmission, topology)
    }
}
