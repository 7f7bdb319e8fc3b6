//! Position key to contract address mapping.

use alloy::primitives::Address;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::relay::error::RelayError;

/// Errors raised while building or checking the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {message}")]
    Parse { path: String, message: String },

    #[error("position '{key}' has an invalid address '{value}'")]
    InvalidAddress { key: String, value: String },

    #[error("position keys must not be empty")]
    EmptyKey,

    #[error("position '{0}' is mapped to the zero address")]
    ZeroAddress(String),

    #[error("position '{key}' maps to {manifest} in the manifest but {inline} inline")]
    Conflict {
        key: String,
        manifest: Address,
        inline: Address,
    },

    #[error("no positions registered")]
    Empty,

    #[error("deployment check failed for '{key}' at {address}: {reason}")]
    Verification {
        key: String,
        address: Address,
        reason: String,
    },
}

/// Immutable registry of election contracts, keyed by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractRegistry {
    positions: BTreeMap<String, Address>,
}

impl ContractRegistry {
    /// Build a registry, rejecting empty keys and zero addresses.
    pub fn new(positions: BTreeMap<String, Address>) -> Result<Self, RegistryError> {
        for (key, address) in &positions {
            if key.trim().is_empty() {
                return Err(RegistryError::EmptyKey);
            }
            if address.is_zero() {
                return Err(RegistryError::ZeroAddress(key.clone()));
            }
        }
        Ok(Self { positions })
    }

    /// Contract address for `position`. Unknown keys are never defaulted.
    pub fn resolve(&self, position: &str) -> Result<Address, RelayError> {
        self.positions
            .get(position)
            .copied()
            .ok_or_else(|| RelayError::UnknownPosition(position.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.positions.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
