//! Access-control synchronization contract.
//!
//! The lifecycle service is the only caller; it re-applies the full
//! protection state on every transition and on every chunk load, so
//! implementations must be idempotent overwrites.

use std::fmt;

use contracts::RegionDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectionError {
    Backend(String),
}

impl fmt::Display for ProtectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(message) => write!(f, "protection sync error: {message}"),
        }
    }
}

impl std::error::Error for ProtectionError {}

pub trait ProtectionSync: Send + Sync + fmt::Debug {
    /// No building by anyone: NEW, RESERVED, ABANDONED, REPOSSESSED islands.
    fn set_reserved(&self, region: &RegionDescriptor) -> Result<(), ProtectionError>;

    /// Open to everyone: RESOURCE islands.
    fn set_public(&self, region: &RegionDescriptor) -> Result<(), ProtectionError>;

    /// Exclusive to the owner: PRIVATE islands.
    fn set_private(&self, region: &RegionDescriptor, owner: &str) -> Result<(), ProtectionError>;
}
