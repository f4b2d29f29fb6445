//! Schema versioning for the journey database.
//!
//! The version lives in `metadata` under `schema_version`. Opening a store
//! applies every migration between the stored version and
//! [`CURRENT_VERSION`] in one transaction; a database written by a newer
//! milelog is refused rather than guessed at.

use std::cmp::Ordering;

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use super::schema;
use crate::error::{Error, Result};

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

const VERSION_KEY: &str = "schema_version";

type Migration = fn(&Connection) -> Result<()>;

/// Bring `conn` up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns [`Error::DatabaseMigration`] if the stored version is unreadable
/// or newer than this build, or a query error if a migration fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(schema::CREATE_METADATA_TABLE, [])?;

    let version = schema_version(conn)?;
    match version.cmp(&CURRENT_VERSION) {
        Ordering::Equal => Ok(()),
        Ordering::Less => upgrade(conn, version),
        Ordering::Greater => Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version \
                 {CURRENT_VERSION}"
            ),
        }),
    }
}

/// The stored schema version, 0 for a database milelog has never touched.
fn schema_version(conn: &Connection) -> Result<i32> {
    let raw: Option<String> = conn
        .query_row(schema::READ_METADATA, [VERSION_KEY], |row| row.get(0))
        .optional()?;

    match raw {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

fn migration(version: i32) -> Result<Migration> {
    match version {
        1 => Ok(create_slots),
        _ => Err(Error::DatabaseMigration {
            message: format!("unknown migration version: {version}"),
        }),
    }
}

fn upgrade(conn: &Connection, from: i32) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for version in (from + 1)..=CURRENT_VERSION {
        let migrate = migration(version)?;
        migrate(&tx)?;
        debug!(version, "Applied migration");
    }
    tx.execute(schema::WRITE_METADATA, (VERSION_KEY, CURRENT_VERSION.to_string()))?;
    tx.commit()?;

    info!(from, to = CURRENT_VERSION, "Journey database migrated");
    Ok(())
}

/// v1: the slots table.
fn create_slots(conn: &Connection) -> Result<()> {
    conn.execute(schema::CREATE_SLOTS_TABLE, [])?;
    Ok(())
}
