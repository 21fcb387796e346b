//! Core type definitions for the correlation engine.
//!
//! This module defines the fundamental types used throughout the crate.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Simulated time in seconds.
///
/// All packet events and reporter firing times use the same `SimTime`
/// representation, matching the timeline of the external simulation engine.
/// Timestamps are non-negative for the duration of a run.
pub type SimTime = f64;

/// Unique identifier for a simulated network participant.
///
/// Node identifiers are assigned once at setup by the external engine and
/// never change for the lifetime of a run.
pub type NodeId = u32;

/// Index of a fixed-length reporting window.
pub type WindowIndex = usize;

/// Opaque network-layer endpoint identifier.
///
/// An `Address` is one-to-one with a [`NodeId`] for the lifetime of a run;
/// the mapping is established exactly once when the
/// [`AddressRegistry`](crate::registry::AddressRegistry) is built from the
/// engine's address-assignment result.
///
/// # Example
///
/// ```
/// use linkscope::types::Address;
///
/// let addr = Address::from([10, 0, 0, 7]);
/// assert_eq!(addr.to_string(), "10.0.0.7");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(u32);

impl Address {
    /// Creates an address from its raw 32-bit representation.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw 32-bit representation.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl From<[u8; 4]> for Address {
    fn from(octets: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(octets))
    }
}

impl From<Ipv4Addr> for Address {
    fn from(addr: Ipv4Addr) -> Self {
        Self(u32::from(addr))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Ipv4Addr::from(self.0))
    }
}
