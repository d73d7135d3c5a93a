//! Island parcel lifecycle: ownership, taxation, repossession, and the
//! synchronization that keeps access-control state consistent with recorded
//! ownership. The service in [`lifecycle`] owns every state transition; the
//! other modules are the collaborator contracts it is driven through.

pub mod actor;
pub mod economy;
pub mod geometry;
pub mod lifecycle;
pub mod protect;
pub mod store;

pub use lifecycle::{DawnMetrics, IslandLifecycle, LifecycleError};

pub(crate) fn hash_bytes(input: &[u8]) -> u64 {
    // FNV-1a 64-bit
    let mut hash = 0xcbf29ce484222325_u64;
    for byte in input {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

pub(crate) fn mix64(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}
