//! # Linkscope
//!
//! A trace-correlation and windowed-topology-reconstruction engine for
//! discrete-event network simulations.
//!
//! The external simulation engine owns nodes, mobility, radio, and routing;
//! it emits a chronological stream of low-level packet events. Linkscope
//! consumes that stream and reconstructs who talked to whom:
//!
//! - **Classification**: each raw packet observation becomes a semantic
//!   transmission event (data vs acknowledgment, outbound vs inbound), or is
//!   silently discarded.
//! - **Peer resolution**: the remote endpoint's address is mapped to a node
//!   identifier through an immutable-after-setup registry.
//! - **Windowed aggregation**: discovered node-pair links accumulate into
//!   fixed-length time windows as canonicalized, deduplicated sets.
//! - **Reporting**: once per window, a scheduled job emits one topology line
//!   and clears the window's state.
//!
//! ## Design Principles
//!
//! - **No hidden state**: everything lives in an explicit
//!   [`TraceCorrelator`] context object owned by the surrounding driver.
//! - **Typed boundary**: engine callbacks are converted once into
//!   [`RawPacketEvent`] records; the correlation path never parses strings.
//! - **Run-to-completion**: the engine dispatches callbacks as a totally
//!   ordered sequence; no handler blocks, so no locking is needed.
//! - **Discards are not faults**: uninteresting protocols, control
//!   handshakes, and truncated headers are normal traffic-shape outcomes.
//!
//! ## Quick Start
//!
//! ```rust
//! use linkscope::{Address, AddressRegistry, CorrelatorConfig, Direction,
//!                 RawPacketEvent, TraceCorrelator};
//!
//! // Built once from the engine's address-assignment result.
//! let registry = AddressRegistry::from_assignments([
//!     (Address::from([10, 0, 0, 1]), 0),
//!     (Address::from([10, 0, 0, 2]), 1),
//! ])
//! .unwrap();
//!
//! let mut correlator: TraceCorrelator<Vec<u8>, Vec<u8>> = TraceCorrelator::new(
//!     CorrelatorConfig::default(),
//!     registry,
//!     Vec::new(), // transmission log destination
//!     Vec::new(), // topology log destination
//! )
//! .unwrap();
//!
//! // One callback per packet observation, delivered by the engine.
//! correlator.handle_packet(&RawPacketEvent::endpoints(
//!     2.0,
//!     0,
//!     Direction::Outbound,
//!     Address::from([10, 0, 0, 1]),
//!     Address::from([10, 0, 0, 2]),
//!     512,
//!     false,
//! ));
//!
//! // The engine's scheduler fires one report per window.
//! for (_fire_time, index) in correlator.reporter_schedule() {
//!     correlator.report_window(index);
//! }
//!
//! let stats = correlator.export_stats();
//! assert_eq!(stats["correlator"]["links_observed"], 1);
//! ```

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod correlator;
pub mod event;
pub mod link;
pub mod logger;
pub mod proximity;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod types;

// Re-export commonly used types
pub use aggregate::{AggregatorStats, LinkWindowAggregator, WindowState};
pub use classify::{PacketClassifier, PROTOCOL_TCP};
pub use config::{ConfigError, CorrelatorConfig, CorrelatorConfigBuilder};
pub use correlator::{CorrelatorStats, SetupError, TraceCorrelator};
pub use event::{
    node_id_from_trace_context, Direction, PacketCapture, RawPacketEvent, TransmissionEvent,
    TransmissionKind,
};
pub use link::Link;
pub use logger::{LogVocabulary, TransmissionLogger};
pub use proximity::{Position, ProximityLinkSource};
pub use registry::{AddressRegistry, RegistryError};
pub use report::{reporter_schedule, TopologyReporter};
pub use resolve::{resolve_peer, PeerResolution};
pub use types::{Address, NodeId, SimTime, WindowIndex};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging.
///
/// # Example
///
/// ```rust,ignore
/// linkscope::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
