//! `SQLite` schema definitions for milelog.
//!
//! Journeys are not stored one row per record. Each named slot holds the
//! whole collection as a JSON array, so a slot's value is exactly what
//! `milelog list --json` prints.

/// SQL statement to create the slots table.
pub const CREATE_SLOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS slots (
    name TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Read a metadata value.
pub const READ_METADATA: &str = "SELECT value FROM metadata WHERE key = ?1";

/// Set a metadata value.
pub const WRITE_METADATA: &str = "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)";

/// Create a slot holding an empty collection unless it already exists.
pub const INIT_SLOT: &str = "INSERT OR IGNORE INTO slots (name, value) VALUES (?1, '[]')";

/// Read a slot's raw value.
pub const READ_SLOT: &str = "SELECT value FROM slots WHERE name = ?1";

/// Replace a slot's value, creating the slot if needed.
pub const WRITE_SLOT: &str = r"
INSERT INTO slots (name, value) VALUES (?1, ?2)
ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = datetime('now')
";
