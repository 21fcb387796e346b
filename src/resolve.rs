//! Peer resolution.
//!
//! Maps a classified event's peer address to the node identifier of the
//! communicating counterpart. A link requires two distinct, resolved
//! endpoints: a registry miss or a peer resolving back to the observing node
//! still leaves the event worth logging, but produces no link.

use crate::event::TransmissionEvent;
use crate::link::Link;
use crate::registry::AddressRegistry;

/// Outcome of resolving a classified event's peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerResolution {
    /// Both endpoints resolved to distinct nodes.
    Link(Link),
    /// The peer address is not in the registry.
    UnknownPeer,
    /// The peer resolved to the observing node itself.
    SelfPeer,
}

impl PeerResolution {
    /// Returns the resolved link, if any.
    pub fn link(self) -> Option<Link> {
        match self {
            PeerResolution::Link(link) => Some(link),
            _ => None,
        }
    }
}

/// Resolves the remote endpoint of a classified event.
///
/// The peer address was already picked by direction during classification
/// (destination when outbound, source when inbound); this step only consults
/// the registry.
pub fn resolve_peer(event: &TransmissionEvent, registry: &AddressRegistry) -> PeerResolution {
    match registry.resolve(event.peer) {
        Some(peer_node) if peer_node == event.node => {
            tracing::debug!(node = event.node, "peer resolved to the observing node");
            PeerResolution::SelfPeer
        }
        Some(peer_node) => PeerResolution::Link(Link::new(event.node, peer_node)),
        None => {
            tracing::debug!(node = event.node, peer = %event.peer, "peer address not registered");
            PeerResolution::UnknownPeer
        }
    }
}
