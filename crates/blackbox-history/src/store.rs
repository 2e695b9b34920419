//! SQLite persistence for source histories.
//!
//! Each source file has an append-only list of history rows. Rows are read
//! back in ascending id order, which is the order they were recorded in.

use crate::error::{StoreError, StoreResult};
use crate::record::{HistoryEntry, HistoryKind, HistoryRecord, VersionSequence};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS source_files (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS source_histories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_file_id INTEGER NOT NULL REFERENCES source_files(id),
    source_history_type TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (unixepoch())
);
CREATE INDEX IF NOT EXISTS idx_histories_file ON source_histories(source_file_id, id);
"#;

/// Summary of one recorded source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFileSummary {
    pub name: String,
    pub records: usize,
    pub last_recorded: Option<DateTime<Utc>>,
}

/// Database handle for source histories.
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.as_ref().display(), "Opened history store");
        Ok(Self { conn })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Append a record to a file's history, returning the new row id.
    pub fn append(&self, entry: &HistoryEntry) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT OR IGNORE INTO source_files (name) VALUES (?1)",
            params![entry.file],
        )?;
        let file_id: i64 = self.conn.query_row(
            "SELECT id FROM source_files WHERE name = ?1",
            params![entry.file],
            |row| row.get(0),
        )?;

        self.conn.execute(
            "INSERT INTO source_histories (source_file_id, source_history_type, content)
             VALUES (?1, ?2, ?3)",
            params![
                file_id,
                entry.record.kind().as_str(),
                entry.record.content()
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        info!(
            file = %entry.file,
            kind = %entry.record.kind(),
            id,
            "Recorded history"
        );
        Ok(id)
    }

    /// Load the full history of a file.
    pub fn load(&self, file: &str) -> StoreResult<VersionSequence> {
        let file_id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM source_files WHERE name = ?1",
                params![file],
                |row| row.get(0),
            )
            .optional()?;
        let file_id = file_id.ok_or_else(|| StoreError::file_not_found(file))?;

        let mut stmt = self.conn.prepare(
            "SELECT id, source_history_type, content FROM source_histories
             WHERE source_file_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![file_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, kind, content) = row?;
            let kind: HistoryKind = kind
                .parse()
                .map_err(|source| StoreError::UnknownHistoryType { id, source })?;
            records.push(HistoryRecord::new(kind, content));
        }

        debug!(file, records = records.len(), "Loaded history");
        Ok(VersionSequence::for_file(file, records))
    }

    /// List every file that has recorded history.
    pub fn files(&self) -> StoreResult<Vec<SourceFileSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.name, COUNT(h.id), MAX(h.created_at)
             FROM source_files f
             LEFT JOIN source_histories h ON h.source_file_id = f.id
             GROUP BY f.id
             ORDER BY f.name",
        )?;

        let rows = stmt.query_map([], |row| {
            let name: String = row.get(0)?;
            let records: i64 = row.get(1)?;
            let last: Option<i64> = row.get(2)?;
            Ok(SourceFileSummary {
                name,
                records: records as usize,
                last_recorded: last.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            })
        })?;

        let files = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(files)
    }
}
