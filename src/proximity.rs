//! Proximity-based link derivation.
//!
//! An alternative source of [`Link`] values for the aggregator: instead of
//! inferring links from observed packet exchange, this module infers them
//! from geometric proximity — every pair of nodes within communication range
//! counts as linked. The aggregator contract is unchanged; a driver using
//! this definition simply feeds the derived links into
//! [`LinkWindowAggregator::observe`](crate::aggregate::LinkWindowAggregator::observe)
//! at its chosen sampling times.

use serde::{Deserialize, Serialize};

use crate::config::CorrelatorConfig;
use crate::link::Link;
use crate::types::NodeId;

/// A node position in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Creates a position from coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Derives active links from node positions and a distance threshold.
#[derive(Clone, Copy, Debug)]
pub struct ProximityLinkSource {
    comm_range: f64,
}

impl ProximityLinkSource {
    /// Creates a source with the given communication range in meters.
    pub fn new(comm_range: f64) -> Self {
        Self { comm_range }
    }

    /// Creates a source from a configuration value object.
    pub fn from_config(config: &CorrelatorConfig) -> Self {
        Self::new(config.comm_range)
    }

    /// Returns the communication range in meters.
    pub fn comm_range(&self) -> f64 {
        self.comm_range
    }

    /// Returns every pair of nodes within communication range.
    ///
    /// Links come back canonicalized and in canonical `(low, high)` order,
    /// deduplicated if a node appears more than once in the input.
    pub fn active_links(&self, positions: &[(NodeId, Position)]) -> Vec<Link> {
        let mut links = Vec::new();
        for (i, (node_a, pos_a)) in positions.iter().enumerate() {
            for (node_b, pos_b) in &positions[i + 1..] {
                if node_a != node_b && pos_a.distance(pos_b) <= self.comm_range {
                    links.push(Link::new(*node_a, *node_b));
                }
            }
        }
        links.sort_unstable();
        links.dedup();
        links
    }
}
