//! Sqlite-backed island record store.
//!
//! Records are persisted as one row per island key with the full snapshot in
//! a JSON column; the denormalized `state` and `owner` columns exist for the
//! secondary lookups and for operators poking at the database directly.

use std::fmt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{IslandKey, IslandRecord};
use isle_core::store::{RecordStore, StoreError};
use rusqlite::{params, Connection, OptionalExtension};

fn backend(err: impl fmt::Display) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Durable [`RecordStore`] over a single sqlite database. The connection is
/// serialized behind a mutex; per-island write ordering is the lifecycle
/// service's concern, not this layer's.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(backend)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(backend)?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(backend)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Ephemeral database for tests and dry runs. Skips the WAL journal
    /// pragma, which does not apply to in-memory connections.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS islands (
                world TEXT NOT NULL,
                x INTEGER NOT NULL,
                z INTEGER NOT NULL,
                state TEXT NOT NULL,
                owner TEXT,
                record_json TEXT NOT NULL,
                PRIMARY KEY (world, x, z)
            );

            CREATE INDEX IF NOT EXISTS idx_islands_owner ON islands(owner);
            CREATE INDEX IF NOT EXISTS idx_islands_world_state ON islands(world, state);
            ",
        )
        .map_err(backend)?;

        conn.execute(
            "INSERT OR IGNORE INTO schema_migrations(version, name) VALUES(1, 'initial_v1')",
            [],
        )
        .map_err(backend)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn decode(record_json: String) -> Result<IslandRecord, StoreError> {
    serde_json::from_str(&record_json).map_err(backend)
}

impl RecordStore for SqliteStore {
    fn get(&self, key: &IslandKey) -> Result<Option<IslandRecord>, StoreError> {
        let conn = self.lock();
        let record_json = conn
            .query_row(
                "SELECT record_json FROM islands WHERE world = ?1 AND x = ?2 AND z = ?3",
                params![key.world.as_str(), key.x, key.z],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(backend)?;
        record_json.map(decode).transpose()
    }

    fn put(&self, record: IslandRecord) -> Result<(), StoreError> {
        let record_json = serde_json::to_string(&record).map_err(backend)?;
        let conn = self.lock();
        conn.execute(
            "INSERT INTO islands (world, x, z, state, owner, record_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(world, x, z) DO UPDATE SET
                state = excluded.state,
                owner = excluded.owner,
                record_json = excluded.record_json",
            params![
                record.key.world.as_str(),
                record.key.x,
                record.key.z,
                record.state.message_fragment(),
                record.owner.as_deref(),
                record_json,
            ],
        )
        .map_err(backend)?;
        Ok(())
    }

    fn list_by_world(&self, world: &str) -> Result<Vec<IslandRecord>, StoreError> {
        let conn = self.lock();
        let mut statement = conn
            .prepare("SELECT record_json FROM islands WHERE world = ?1 ORDER BY x, z")
            .map_err(backend)?;
        let rows = statement
            .query_map(params![world], |row| row.get::<_, String>(0))
            .map_err(backend)?;
        rows.map(|row| decode(row.map_err(backend)?)).collect()
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<IslandRecord>, StoreError> {
        let conn = self.lock();
        let mut statement = conn
            .prepare("SELECT record_json FROM islands WHERE owner = ?1 ORDER BY world, x, z")
            .map_err(backend)?;
        let rows = statement
            .query_map(params![owner], |row| row.get::<_, String>(0))
            .map_err(backend)?;
        rows.map(|row| decode(row.map_err(backend)?)).collect()
    }

    fn list_all(&self) -> Result<Vec<IslandRecord>, StoreError> {
        let conn = self.lock();
        let mut statement = conn
            .prepare("SELECT record_json FROM islands ORDER BY world, x, z")
            .map_err(backend)?;
        let rows = statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(backend)?;
        rows.map(|row| decode(row.map_err(backend)?)).collect()
    }
}
