//! Record store contract and the in-memory reference implementation.
//!
//! Only the lifecycle service writes through this interface; everything else
//! in the system treats island records as read-only.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use contracts::{IslandKey, IslandRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend I/O or serialization failure, with the backend's message.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(message) => write!(f, "record store error: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable keyed persistence of island records with secondary lookups by
/// owner and world. Implementations must be safe for concurrent use; the
/// lifecycle service layers per-island serialization on top.
pub trait RecordStore: Send + Sync + fmt::Debug {
    fn get(&self, key: &IslandKey) -> Result<Option<IslandRecord>, StoreError>;

    /// Inserts or wholesale-replaces the record for its key.
    fn put(&self, record: IslandRecord) -> Result<(), StoreError>;

    fn list_by_world(&self, world: &str) -> Result<Vec<IslandRecord>, StoreError>;

    fn list_by_owner(&self, owner: &str) -> Result<Vec<IslandRecord>, StoreError>;

    fn list_all(&self) -> Result<Vec<IslandRecord>, StoreError>;
}

/// `BTreeMap`-backed store for tests and single-process embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<IslandKey, IslandRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &IslandKey) -> Result<Option<IslandRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned())
    }

    fn put(&self, record: IslandRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(record.key.clone(), record);
        Ok(())
    }

    fn list_by_world(&self, world: &str) -> Result<Vec<IslandRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .values()
            .filter(|record| record.key.world == world)
            .cloned()
            .collect())
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<IslandRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .values()
            .filter(|record| record.owner.as_deref() == Some(owner))
            .cloned()
            .collect())
    }

    fn list_all(&self) -> Result<Vec<IslandRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.values().cloned().collect())
    }
}
