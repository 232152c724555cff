//! Slot store contracts with SQLite (durable) and in-memory (session) backends.
//!
//! # Responsibility
//! - Provide `get`/`set`/`remove` over string-keyed slots.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `set` overwrites any previous value for the key.
//! - `get` on a missing key returns `Ok(None)`, never an error.

use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Durable slot holding the serialized quote collection.
pub const QUOTES_SLOT: &str = "quotes";
/// Durable slot holding the selected category filter.
pub const SELECTED_CATEGORY_SLOT: &str = "selectedCategory";
/// Older name for the selected category slot, read as a fallback.
pub const LEGACY_CATEGORY_SLOT: &str = "lastCategory";
/// Session slot holding the last displayed quote.
pub const LAST_QUOTE_SLOT: &str = "lastQuote";

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error for slot persistence and schema bootstrap.
#[derive(Debug)]
pub enum RepoError {
    Sqlite(rusqlite::Error),
    /// The database was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String-keyed slot storage consumed by the quote store.
pub trait SlotStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;
    fn remove(&self, key: &str) -> RepoResult<()>;
}

/// SQLite-backed durable slots.
pub struct SqliteSlotStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotStore for SqliteSlotStore<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO slots (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.conn.execute("DELETE FROM slots WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// Process-lifetime slots; the session ends when this value is dropped or cleared.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: RefCell<BTreeMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ends the session by discarding every slot.
    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl SlotStore for MemorySlotStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}
