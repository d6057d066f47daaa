//! SQLite-backed key-value store over the `kv_entries` table.
//!
//! # Invariants
//! - Connections come from `open_db*`, which creates `kv_entries` and
//!   stamps `PRAGMA user_version` with `KV_TABLE_VERSION`.
//! - A file stamped with a newer table version is refused, never rewritten.
//! - `set` is a single upsert statement, atomic under SQLite's own
//!   statement-level transaction.

use super::{KeyValueStore, KvError, KvResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

/// Layout version of the `kv_entries` table.
///
/// The JSON document stored under the resolution key carries its own
/// version; this one only covers the table.
pub const KV_TABLE_VERSION: u32 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_KV_ENTRIES: &str = "
CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);";

/// Opens the store file, creating it and the table when missing.
///
/// # Errors
/// - `KvError::Sqlite` when the file cannot be opened or prepared.
/// - `KvError::UnsupportedTableVersion` when a newer build wrote the file.
pub fn open_db(path: impl AsRef<Path>) -> KvResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens an in-memory store. Data is discarded with the connection.
pub fn open_db_in_memory() -> KvResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> KvResult<Connection> {
    let started_at = Instant::now();
    let result = connect()
        .map_err(KvError::from)
        .and_then(|conn| prepare_table(&conn).map(|()| conn));

    match &result {
        Ok(_) => info!(
            "event=kv_open module=kv status=ok mode={} table_version={} duration_ms={}",
            mode,
            KV_TABLE_VERSION,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=kv_open module=kv status=error mode={} duration_ms={} error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn prepare_table(conn: &Connection) -> KvResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;

    let found = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    if found > KV_TABLE_VERSION {
        return Err(KvError::UnsupportedTableVersion {
            found,
            supported: KV_TABLE_VERSION,
        });
    }
    if found == KV_TABLE_VERSION {
        return Ok(());
    }

    conn.execute_batch(&format!(
        "BEGIN;{CREATE_KV_ENTRIES}PRAGMA user_version = {KV_TABLE_VERSION};COMMIT;"
    ))?;
    info!("event=kv_table_created module=kv status=ok from_version={found} to_version={KV_TABLE_VERSION}");
    Ok(())
}

/// Key-value store borrowing an open SQLite connection.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
