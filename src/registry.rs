//! Address-to-node registry.
//!
//! The registry maps network addresses to node identifiers. It is built
//! exactly once from the engine's address-assignment result, before any
//! packet event arrives, and is read-only for the remainder of the run.
//!
//! # Example
//!
//! ```
//! use linkscope::registry::AddressRegistry;
//! use linkscope::types::Address;
//!
//! let registry = AddressRegistry::from_assignments([
//!     (Address::from([10, 0, 0, 1]), 0),
//!     (Address::from([10, 0, 0, 2]), 1),
//! ])
//! .unwrap();
//!
//! assert_eq!(registry.resolve(Address::from([10, 0, 0, 2])), Some(1));
//! assert_eq!(registry.resolve(Address::from([10, 0, 0, 9])), None);
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{Address, NodeId};

/// Errors that can occur while building the registry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("address {address} is already bound to node {existing}, cannot rebind to node {attempted}")]
    DuplicateAddress {
        address: Address,
        existing: NodeId,
        attempted: NodeId,
    },
}

/// Immutable-after-setup mapping from [`Address`] to [`NodeId`].
///
/// Lookup of an unknown address is a defined miss (`None`), not an error.
/// There is no deletion operation; once setup completes the surrounding
/// driver holds the registry by shared reference.
#[derive(Clone, Debug, Default)]
pub struct AddressRegistry {
    bindings: HashMap<Address, NodeId>,
}

impl AddressRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the engine's address-assignment result.
    ///
    /// # Arguments
    /// * `assignments` - One `(address, node)` pair per participating node
    ///
    /// # Returns
    /// The populated registry, or a [`RegistryError`] if any address is
    /// assigned to two different nodes.
    pub fn from_assignments(
        assignments: impl IntoIterator<Item = (Address, NodeId)>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for (address, node) in assignments {
            registry.register(address, node)?;
        }
        Ok(registry)
    }

    /// Binds an address to a node during setup.
    ///
    /// Re-registering the identical binding is a no-op; binding an address
    /// that already belongs to a *different* node is a setup fault.
    pub fn register(&mut self, address: Address, node: NodeId) -> Result<(), RegistryError> {
        match self.bindings.get(&address) {
            Some(&existing) if existing != node => Err(RegistryError::DuplicateAddress {
                address,
                existing,
                attempted: node,
            }),
            Some(_) => Ok(()),
            None => {
                tracing::debug!(%address, node, "registered address binding");
                self.bindings.insert(address, node);
                Ok(())
            }
        }
    }

    /// Resolves an address to its node identifier.
    ///
    /// An unknown address is a defined miss, returning `None`.
    pub fn resolve(&self, address: Address) -> Option<NodeId> {
        self.bindings.get(&address).copied()
    }

    /// Returns the number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no addresses are registered.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Returns an iterator over the registered bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &NodeId)> {
        self.bindings.iter()
    }
}
