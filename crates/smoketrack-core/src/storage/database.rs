//! SQLite-backed persistence for the tracker record.
//!
//! The whole record is stored as one JSON document in a key-value table,
//! read and written wholesale. A missing or unreadable document loads as a
//! fresh default record.

use rusqlite::{params, Connection};
use std::cell::RefCell;
use std::path::Path;

use super::data_dir;
use crate::error::{Result, StorageError};
use crate::state::{upgrade, StateRecord};

/// Key under which the record is stored.
pub const STATE_KEY: &str = "smoke_tracker:v1";

/// Load-or-default and save of the tracker record.
pub trait StateStore {
    /// Load the record, upgraded to the current schema.
    ///
    /// Returns a default record when nothing is stored or the stored document
    /// cannot be parsed.
    fn load(&self) -> Result<StateRecord>;

    /// Replace the stored record.
    fn save(&self, state: &StateRecord) -> Result<()>;
}

/// Parse a stored document, falling back to the default record.
fn decode_state(raw: Option<String>) -> StateRecord {
    let Some(raw) = raw else {
        return StateRecord::default();
    };
    let value = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "stored record is not valid JSON; starting fresh");
            return StateRecord::default();
        }
    };
    upgrade::upgrade(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "stored record has unexpected shape; starting fresh");
        StateRecord::default()
    })
}

/// SQLite database holding the tracker record.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/smoketrack/smoketrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("smoketrack.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl StateStore for Database {
    fn load(&self) -> Result<StateRecord> {
        Ok(decode_state(self.kv_get(STATE_KEY)?))
    }

    fn save(&self, state: &StateRecord) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.kv_set(STATE_KEY, &json)?;
        Ok(())
    }
}

/// In-process store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a raw document, as if written by another build.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: RefCell::new(Some(raw.into())),
        }
    }

    /// The stored document, if any.
    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<StateRecord> {
        Ok(decode_state(self.raw()))
    }

    fn save(&self, state: &StateRecord) -> Result<()> {
        *self.raw.borrow_mut() = Some(serde_json::to_string(state)?);
        Ok(())
    }
}
