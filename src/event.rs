//! Event records at the engine boundary.
//!
//! The external simulation engine delivers packet observations as callbacks.
//! This module defines the typed records those callbacks are converted into
//! exactly once at the boundary: [`RawPacketEvent`] for a raw observation and
//! [`TransmissionEvent`] for the classified result. A `TransmissionEvent` is
//! ephemeral; it is produced and consumed within one handling step and never
//! stored beyond logging and aggregation.

use serde::{Deserialize, Serialize};

use crate::types::{Address, NodeId, SimTime};

/// Direction of a transmission relative to the observing node.
///
/// Derived from which trace point fired: the egress trace point produces
/// `Outbound` events, the ingress trace point produces `Inbound` events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// The observing node sent the packet.
    Outbound,
    /// The observing node received the packet.
    Inbound,
}

/// Semantic kind of a classified transmission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransmissionKind {
    /// Carries application payload.
    Data,
    /// Pure acknowledgment, no payload.
    Ack,
}

/// What the trace point captured about the packet.
///
/// Engines either hand over the raw network-layer buffer (header-based
/// classification) or the already-extracted endpoint addresses
/// (address-based classification).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PacketCapture {
    /// Raw packet bytes starting at the network-layer header.
    Headers(Vec<u8>),
    /// Explicit endpoint addresses with pre-extracted payload facts.
    Endpoints {
        /// Network-layer source address.
        source: Address,
        /// Network-layer destination address.
        destination: Address,
        /// Remaining payload length after all protocol headers.
        payload_len: u32,
        /// Whether the transport acknowledgment flag was set.
        acked: bool,
    },
}

/// A raw packet observation delivered by the external engine.
///
/// This is the typed record constructed once at the simulation boundary;
/// node identifiers arrive as fields, not as strings to be re-parsed at
/// every call site.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawPacketEvent {
    /// Simulated time of the observation.
    pub time: SimTime,
    /// The node at which the trace point fired.
    pub node: NodeId,
    /// Which trace point fired (egress or ingress).
    pub direction: Direction,
    /// The captured packet content.
    pub capture: PacketCapture,
}

impl RawPacketEvent {
    /// Creates a header-based observation from a raw packet buffer.
    pub fn headers(
        time: SimTime,
        node: NodeId,
        direction: Direction,
        buffer: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            time,
            node,
            direction,
            capture: PacketCapture::Headers(buffer.into()),
        }
    }

    /// Creates an address-based observation from explicit endpoints.
    pub fn endpoints(
        time: SimTime,
        node: NodeId,
        direction: Direction,
        source: Address,
        destination: Address,
        payload_len: u32,
        acked: bool,
    ) -> Self {
        Self {
            time,
            node,
            direction,
            capture: PacketCapture::Endpoints {
                source,
                destination,
                payload_len,
                acked,
            },
        }
    }
}

/// A classified transmission, ready for logging and peer resolution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransmissionEvent {
    /// Simulated time of the observation.
    pub time: SimTime,
    /// The observing node.
    pub node: NodeId,
    /// Direction relative to the observing node.
    pub direction: Direction,
    /// Data or acknowledgment.
    pub kind: TransmissionKind,
    /// Remaining payload length after all protocol headers.
    pub payload_len: u32,
    /// Address of the remote endpoint (destination when outbound, source
    /// when inbound).
    pub peer: Address,
}

/// Extracts a node identifier from a path-encoded trace context string.
///
/// Legacy engine boundaries key callbacks by strings such as
/// `"/NodeList/7/$ns3::Ipv4L3Protocol/Tx"`. Adapters for such boundaries can
/// use this helper once, when constructing the [`RawPacketEvent`]; the
/// correlation path itself never parses strings.
///
/// # Example
///
/// ```
/// use linkscope::event::node_id_from_trace_context;
///
/// assert_eq!(
///     node_id_from_trace_context("/NodeList/7/DeviceList/0/Mac/MacTx"),
///     Some(7)
/// );
/// assert_eq!(node_id_from_trace_context("/DeviceList/0"), None);
/// ```
pub fn node_id_from_trace_context(context: &str) -> Option<NodeId> {
    const PREFIX: &str = "/NodeList/";

    let start = context.find(PREFIX)? + PREFIX.len();
    let rest = &context[start..];
    let end = rest.find('/').unwrap_or(rest.len());
    rest[..end].parse().ok()
}
