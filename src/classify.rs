//! Packet event classification.
//!
//! The classifier turns a raw packet observation into a semantic
//! [`TransmissionEvent`], or discards it. Discards are normal traffic-shape
//! outcomes, not faults: packets of an uninteresting transport protocol,
//! pure control handshakes, and truncated or unparsable headers are all
//! silently dropped, and processing of subsequent events continues.
//!
//! # Header layout
//!
//! Header-based captures start at the network-layer (IPv4) header:
//!
//! | Field | Offset | Meaning |
//! |-------|--------|---------|
//! | version / IHL | 0 | header length = `(byte & 0x0f) * 4` |
//! | protocol | 9 | transport protocol identifier |
//! | source | 12..16 | source address |
//! | destination | 16..20 | destination address |
//!
//! The transport-layer (TCP) header follows:
//!
//! | Field | Offset | Meaning |
//! |-------|--------|---------|
//! | data offset | 12 | header length = `(byte >> 4) * 4` |
//! | flags | 13 | acknowledgment flag = bit `0x10` |
//!
//! Whatever remains after both headers is the payload.

use crate::event::{Direction, PacketCapture, RawPacketEvent, TransmissionEvent, TransmissionKind};
use crate::types::Address;

/// IANA protocol number for TCP, the default protocol of interest.
pub const PROTOCOL_TCP: u8 = 6;

const IPV4_MIN_HEADER_LEN: usize = 20;
const TCP_MIN_HEADER_LEN: usize = 20;
const TCP_FLAG_ACK: u8 = 0x10;

/// Parsed network-layer header with the transport segment it wraps.
struct Ipv4Slice<'a> {
    protocol: u8,
    source: Address,
    destination: Address,
    transport: &'a [u8],
}

/// Parsed transport-layer facts.
struct TcpSlice {
    payload_len: u32,
    acked: bool,
}

/// Strips the IPv4 header from a raw buffer.
///
/// Returns `None` on anything malformed: short buffer, non-IPv4 version,
/// or a header length field pointing past the end of the buffer.
fn parse_ipv4(buffer: &[u8]) -> Option<Ipv4Slice<'_>> {
    if buffer.len() < IPV4_MIN_HEADER_LEN {
        return None;
    }
    if buffer[0] >> 4 != 4 {
        return None;
    }

    let header_len = usize::from(buffer[0] & 0x0f) * 4;
    if header_len < IPV4_MIN_HEADER_LEN || buffer.len() < header_len {
        return None;
    }

    let source = Address::from([buffer[12], buffer[13], buffer[14], buffer[15]]);
    let destination = Address::from([buffer[16], buffer[17], buffer[18], buffer[19]]);

    Some(Ipv4Slice {
        protocol: buffer[9],
        source,
        destination,
        transport: &buffer[header_len..],
    })
}

/// Strips the TCP header from a transport segment.
///
/// Returns `None` when the segment is shorter than the header it claims
/// to carry.
fn parse_tcp(segment: &[u8]) -> Option<TcpSlice> {
    if segment.len() < TCP_MIN_HEADER_LEN {
        return None;
    }

    let header_len = usize::from(segment[12] >> 4) * 4;
    if header_len < TCP_MIN_HEADER_LEN || segment.len() < header_len {
        return None;
    }

    Some(TcpSlice {
        payload_len: (segment.len() - header_len) as u32,
        acked: segment[13] & TCP_FLAG_ACK != 0,
    })
}

/// Classifies raw packet observations into semantic transmission events.
///
/// The classifier never fails: every observation either produces a
/// [`TransmissionEvent`] or is discarded.
#[derive(Clone, Copy, Debug)]
pub struct PacketClassifier {
    /// The transport protocol of interest; other protocols are discarded.
    transport_protocol: u8,
}

impl Default for PacketClassifier {
    fn default() -> Self {
        Self::new(PROTOCOL_TCP)
    }
}

impl PacketClassifier {
    /// Creates a classifier for the given transport protocol.
    pub fn new(transport_protocol: u8) -> Self {
        Self { transport_protocol }
    }

    /// Returns the transport protocol of interest.
    pub fn transport_protocol(&self) -> u8 {
        self.transport_protocol
    }

    /// Classifies a raw observation.
    ///
    /// # Returns
    /// The classified event, or `None` when the observation is discarded:
    /// - the transport protocol is not the protocol of interest,
    /// - the packet is a zero-payload non-acknowledgment control handshake,
    /// - a header is truncated or unparsable.
    pub fn classify(&self, raw: &RawPacketEvent) -> Option<TransmissionEvent> {
        let (source, destination, payload_len, acked) = match &raw.capture {
            PacketCapture::Headers(buffer) => {
                let ip = parse_ipv4(buffer)?;
                if ip.protocol != self.transport_protocol {
                    tracing::trace!(
                        node = raw.node,
                        protocol = ip.protocol,
                        "discarding packet of uninteresting protocol"
                    );
                    return None;
                }
                let tcp = parse_tcp(ip.transport)?;
                (ip.source, ip.destination, tcp.payload_len, tcp.acked)
            }
            PacketCapture::Endpoints {
                source,
                destination,
                payload_len,
                acked,
            } => (*source, *destination, *payload_len, *acked),
        };

        // Zero payload with no acknowledgment flag is a pure control
        // handshake (SYN/FIN and friends).
        if payload_len == 0 && !acked {
            return None;
        }

        let kind = if payload_len > 0 {
            TransmissionKind::Data
        } else {
            TransmissionKind::Ack
        };

        let peer = match raw.direction {
            Direction::Outbound => destination,
            Direction::Inbound => source,
        };

        Some(TransmissionEvent {
            time: raw.time,
            node: raw.node,
            direction: raw.direction,
            kind,
            payload_len,
            peer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a minimal IPv4+TCP packet buffer.
    fn tcp_packet(source: [u8; 4], destination: [u8; 4], payload_len: usize, ack: bool) -> Vec<u8> {
        let mut buf = vec![0u8; IPV4_MIN_HEADER_LEN + TCP_MIN_HEADER_LEN + payload_len];
        buf[0] = 0x45; // version 4, IHL 5
        let total = buf.len() as u16;
        buf[2..4].copy_from_slice(&total.to_be_bytes());
        buf[9] = PROTOCOL_TCP;
        buf[12..16].copy_from_slice(&source);
        buf[16..20].copy_from_slice(&destination);
        buf[32] = 0x50; // data offset 5
        if ack {
            buf[33] = TCP_FLAG_ACK;
        }
        buf
    }

    fn outbound(buffer: Vec<u8>) -> RawPacketEvent {
        RawPacketEvent::headers(1.0, 3, Direction::Outbound, buffer)
    }

    #[test]
    fn test_data_packet_outbound() {
        let classifier = PacketClassifier::default();
        let raw = outbound(tcp_packet([10, 0, 0, 4], [10, 0, 0, 8], 512, true));

        let event = classifier.classify(&raw).unwrap();
        assert_eq!(event.kind, TransmissionKind::Data);
        assert_eq!(event.payload_len, 512);
        assert_eq!(event.peer, Address::from([10, 0, 0, 8]));
    }

    #[test]
    fn test_pure_ack() {
        let classifier = PacketClassifier::default();
        let raw = outbound(tcp_packet([10, 0, 0, 4], [10, 0, 0, 8], 0, true));

        let event = classifier.classify(&raw).unwrap();
        assert_eq!(event.kind, TransmissionKind::Ack);
        assert_eq!(event.payload_len, 0);
    }

    #[test]
    fn test_handshake_discarded() {
        // Zero payload, ACK flag clear: SYN-style control packet.
        let classifier = PacketClassifier::default();
        let raw = outbound(tcp_packet([10, 0, 0, 4], [10, 0, 0, 8], 0, false));

        assert!(classifier.classify(&raw).is_none());
    }

    #[test]
    fn test_other_protocol_discarded() {
        let classifier = PacketClassifier::default();
        let mut buffer = tcp_packet([10, 0, 0, 4], [10, 0, 0, 8], 512, false);
        buffer[9] = 17; // UDP

        assert!(classifier.classify(&outbound(buffer)).is_none());
    }

    #[test]
    fn test_inbound_peer_is_source() {
        let classifier = PacketClassifier::default();
        let buffer = tcp_packet([10, 0, 0, 4], [10, 0, 0, 8], 100, false);
        let raw = RawPacketEvent::headers(1.0, 7, Direction::Inbound, buffer);

        let event = classifier.classify(&raw).unwrap();
        assert_eq!(event.peer, Address::from([10, 0, 0, 4]));
    }

    #[test]
    fn test_truncated_network_header_discarded() {
        let classifier = PacketClassifier::default();
        assert!(classifier.classify(&outbound(vec![0x45; 10])).is_none());
    }

    #[test]
    fn test_truncated_transport_header_discarded() {
        let classifier = PacketClassifier::default();
        let mut buffer = tcp_packet([10, 0, 0, 4], [10, 0, 0, 8], 0, true);
        buffer.truncate(IPV4_MIN_HEADER_LEN + 8);

        assert!(classifier.classify(&outbound(buffer)).is_none());
    }

    #[test]
    fn test_bogus_header_lengths_discarded() {
        let classifier = PacketClassifier::default();

        // IHL smaller than the minimum header.
        let mut buffer = tcp_packet([10, 0, 0, 4], [10, 0, 0, 8], 64, true);
        buffer[0] = 0x42;
        assert!(classifier.classify(&outbound(buffer)).is_none());

        // Data offset pointing past the end of the segment.
        let mut buffer = tcp_packet([10, 0, 0, 4], [10, 0, 0, 8], 0, true);
        buffer[32] = 0xf0;
        assert!(classifier.classify(&outbound(buffer)).is_none());
    }

    #[test]
    fn test_non_ipv4_version_discarded() {
        let classifier = PacketClassifier::default();
        let mut buffer = tcp_packet([10, 0, 0, 4], [10, 0, 0, 8], 64, true);
        buffer[0] = 0x65;

        assert!(classifier.classify(&outbound(buffer)).is_none());
    }

    #[test]
    fn test_ip_options_respected() {
        // IHL 6 adds four option bytes before the transport header.
        let classifier = PacketClassifier::default();
        let source = [10, 0, 0, 4];
        let destination = [10, 0, 0, 8];
        let mut buffer = vec![0u8; 24 + TCP_MIN_HEADER_LEN + 32];
        buffer[0] = 0x46;
        buffer[9] = PROTOCOL_TCP;
        buffer[12..16].copy_from_slice(&source);
        buffer[16..20].copy_from_slice(&destination);
        buffer[24 + 12] = 0x50;

        let event = classifier.classify(&outbound(buffer)).unwrap();
        assert_eq!(event.payload_len, 32);
    }

    #[test]
    fn test_endpoints_capture() {
        let classifier = PacketClassifier::default();
        let src = Address::from([10, 0, 0, 1]);
        let dst = Address::from([10, 0, 0, 2]);

        let data = RawPacketEvent::endpoints(2.0, 0, Direction::Outbound, src, dst, 512, false);
        let event = classifier.classify(&data).unwrap();
        assert_eq!(event.kind, TransmissionKind::Data);
        assert_eq!(event.peer, dst);

        let ack = RawPacketEvent::endpoints(2.1, 1, Direction::Inbound, dst, src, 0, true);
        let event = classifier.classify(&ack).unwrap();
        assert_eq!(event.kind, TransmissionKind::Ack);
        assert_eq!(event.peer, dst);

        let handshake = RawPacketEvent::endpoints(2.2, 0, Direction::Outbound, src, dst, 0, false);
        assert!(classifier.classify(&handshake).is_none());
    }

    #[test]
    fn test_custom_protocol_of_interest() {
        let classifier = PacketClassifier::new(17);
        let mut buffer = tcp_packet([10, 0, 0, 4], [10, 0, 0, 8], 64, false);
        buffer[9] = 17;

        assert!(classifier.classify(&outbound(buffer)).is_some());
    }
}
