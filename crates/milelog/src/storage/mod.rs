//! Storage layer for milelog.
//!
//! Completed journeys live in an append-only collection behind the
//! [`JourneyStore`] trait. [`SqliteStore`] persists it as a JSON array in a
//! named slot; [`MemoryStore`] keeps it in a `Vec`.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::journey::{JourneyId, JourneyRecord};

/// An ordered collection of completed journeys.
///
/// Records are only ever appended or removed by id; insertion order is
/// preserved. Mutations take `&mut self`, so a read-modify-write cycle
/// cannot interleave with another operation on the same store.
pub trait JourneyStore {
    /// All stored journeys in insertion order. Empty is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn list(&self) -> Result<Vec<JourneyRecord>>;

    /// Add `record` to the end of the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn append(&mut self, record: JourneyRecord) -> Result<()>;

    /// Delete the journey with `id`. Absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&mut self, id: JourneyId) -> Result<()>;

    /// Look up a single journey.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, id: JourneyId) -> Result<Option<JourneyRecord>> {
        Ok(self.list()?.into_iter().find(|r| r.id == id))
    }

    /// The id of the most recently appended journey.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn newest_id(&self) -> Result<Option<JourneyId>> {
        Ok(self.list()?.iter().map(|r| r.id).max())
    }
}

/// `SQLite`-backed journey store.
///
/// The whole collection is one JSON array in the `slots` table under
/// `slot`. Every mutation reads, modifies and rewrites that array inside a
/// single immediate transaction.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Name of the slot holding the collection.
    slot: String,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store at `path` using slot `slot`.
    ///
    /// Creates parent directories, the schema and an empty slot as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>, slot: impl Into<String>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self::init(path, slot.into(), conn)?;
        info!(
            slot = %store.slot,
            "Journey store opened at {}",
            store.path.display()
        );
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory(slot: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::init(PathBuf::from(":memory:"), slot.into(), conn)
    }

    fn init(path: PathBuf, slot: String, conn: Connection) -> Result<Self> {
        migrations::initialize_schema(&conn)?;
        conn.execute(schema::INIT_SLOT, [&slot])?;
        Ok(Self { path, slot, conn })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the slot name.
    #[must_use]
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Run `f` over the collection inside one write transaction and store
    /// the result.
    ///
    /// If the slot held anything that did not decode, its raw text is copied
    /// to `<slot>.corrupt` before the rewrite drops it.
    fn modify<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<JourneyRecord>),
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut contents = read_slot(&tx, &self.slot)?;

        if let Some(raw) = &contents.damaged {
            let backup = backup_slot_name(&self.slot);
            tx.execute(schema::WRITE_SLOT, params![backup, raw])?;
            warn!(slot = %self.slot, %backup, "Kept damaged journey data before rewriting");
        }

        f(&mut contents.records);
        let json = serde_json::to_string(&contents.records)?;
        tx.execute(schema::WRITE_SLOT, params![self.slot, json])?;
        tx.commit()?;
        Ok(())
    }
}

/// Where the raw text of a damaged slot is kept.
#[must_use]
pub fn backup_slot_name(slot: &str) -> String {
    format!("{slot}.corrupt")
}

/// A decoded slot.
#[derive(Debug, Default)]
struct SlotContents {
    records: Vec<JourneyRecord>,
    /// The raw text, when some or all of it could not be decoded.
    damaged: Option<String>,
}

/// Read and decode a slot.
///
/// A missing slot is empty. Text that is not a JSON array is empty and
/// damaged. Array elements that are not journeys are skipped one by one,
/// so the rest of the collection survives.
fn read_slot(conn: &Connection, slot: &str) -> Result<SlotContents> {
    let raw: Option<String> = conn
        .query_row(schema::READ_SLOT, [slot], |row| row.get(0))
        .optional()?;

    let Some(raw) = raw else {
        return Ok(SlotContents::default());
    };

    let elements: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(elements) => elements,
        Err(e) => {
            warn!(slot, error = %e, "Journey slot is unreadable, treating it as empty");
            return Ok(SlotContents {
                records: Vec::new(),
                damaged: Some(raw),
            });
        }
    };

    let mut records = Vec::with_capacity(elements.len());
    let mut skipped = 0;
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value(element) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(slot, index, error = %e, "Skipping unreadable journey");
                skipped += 1;
            }
        }
    }

    Ok(SlotContents {
        records,
        damaged: (skipped > 0).then_some(raw),
    })
}

impl JourneyStore for SqliteStore {
    fn list(&self) -> Result<Vec<JourneyRecord>> {
        Ok(read_slot(&self.conn, &self.slot)?.records)
    }

    fn append(&mut self, record: JourneyRecord) -> Result<()> {
        let id = record.id;
        self.modify(|records| records.push(record))?;
        info!(%id, "Journey saved");
        Ok(())
    }

    fn remove(&mut self, id: JourneyId) -> Result<()> {
        let mut removed = 0;
        self.modify(|records| {
            let before = records.len();
            records.retain(|r| r.id != id);
            removed = before - records.len();
        })?;
        if removed > 0 {
            info!(%id, "Journey deleted");
        } else {
            debug!(%id, "No journey to delete");
        }
        Ok(())
    }
}

/// In-memory journey store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    records: Vec<JourneyRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl JourneyStore for MemoryStore {
    fn list(&self) -> Result<Vec<JourneyRecord>> {
        Ok(self.records.clone())
    }

    fn append(&mut self, record: JourneyRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn remove(&mut self, id: JourneyId) -> Result<()> {
        self.records.retain(|r| r.id != id);
        Ok(())
    }
}
