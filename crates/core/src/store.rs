// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable record store for reports awaiting delivery.
//!
//! A single SQLite table holds every report the server has not yet
//! acknowledged. Ids come from `AUTOINCREMENT`, so they grow monotonically and
//! are never handed out twice, even after deletes or [`ReportStore::clear`].
//!
//! The connection sits behind a mutex that is held for one statement group at
//! a time. A drain never holds it across a network call, so captures can
//! enqueue while a drain is running.
//!
//! Drains in different processes are serialized by an advisory lock on
//! `<db>.drain.lock` (see [`ReportStore::try_lock_drain`]).

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::drain::DrainSummary;
use crate::error::{Error, Result};
use crate::pending::{PendingReport, QueueCounts, ReportId, ReportStatus};
use crate::report::ReportPayload;

/// SQL schema for the offline store.
pub const SCHEMA: &str = r#"
-- Reports captured locally and not yet acknowledged by the server
CREATE TABLE IF NOT EXISTS pending_reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    last_error TEXT
);

-- Summaries of recent drains (newest kept, older pruned)
CREATE TABLE IF NOT EXISTS drain_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    finished_at TEXT NOT NULL,
    summary TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pending_reports_status ON pending_reports(status);
"#;

/// How many drain summaries are retained.
const DRAIN_LOG_RETENTION: i64 = 50;

const SELECT_COLUMNS: &str = "SELECT id, payload, created_at, status, last_error FROM pending_reports";

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

fn row_to_report(row: &Row<'_>) -> std::result::Result<PendingReport, rusqlite::Error> {
    let payload_str: String = row.get(1)?;
    let created_str: String = row.get(2)?;
    let status_str: String = row.get(3)?;

    let payload = ReportPayload::from_json(&payload_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(PendingReport {
        id: row.get(0)?,
        payload,
        created_at: parse_timestamp(&created_str, "created_at")?,
        status: parse_db(&status_str, "status")?,
        last_error: row.get(4)?,
    })
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Run schema creation on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Path of the drain lock file belonging to a database.
pub fn drain_lock_path(db_path: &Path) -> PathBuf {
    let mut name = OsString::from(db_path.as_os_str());
    name.push(".drain.lock");
    PathBuf::from(name)
}

/// Exclusive right to drain a store. Released on drop.
///
/// In-memory stores have no lock file; their guard is a no-op.
#[derive(Debug)]
pub struct DrainLock {
    _file: Option<File>,
}

/// SQLite-backed queue of reports awaiting delivery.
pub struct ReportStore {
    conn: Mutex<Connection>,
    lock_path: Option<PathBuf>,
}

impl ReportStore {
    /// Open the store at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::StorageUnavailable(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;

        run_migrations(&conn)?;
        Ok(ReportStore {
            conn: Mutex::new(conn),
            lock_path: Some(drain_lock_path(path)),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(ReportStore {
            conn: Mutex::new(conn),
            lock_path: None,
        })
    }

    /// Take the cross-process drain lock without waiting.
    ///
    /// Returns `None` when another handle (in this or another process)
    /// already holds it.
    pub fn try_lock_drain(&self) -> Result<Option<DrainLock>> {
        use fs2::FileExt;

        let Some(path) = &self.lock_path else {
            return Ok(Some(DrainLock { _file: None }));
        };
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| {
                Error::StorageUnavailable(format!("cannot open {}: {e}", path.display()))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(DrainLock { _file: Some(file) })),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => Ok(None),
            Err(e) => Err(Error::StorageUnavailable(format!(
                "cannot lock {}: {e}",
                path.display()
            ))),
        }
    }

    /// Return records left `in_flight` to `pending`.
    ///
    /// Only sound while holding the [`DrainLock`]: any `in_flight` record
    /// then belongs to a drain that crashed or failed to release it.
    pub fn recover_in_flight(&self, _lock: &DrainLock) -> Result<usize> {
        let recovered = self.conn()?.execute(
            "UPDATE pending_reports SET status = 'pending' WHERE status = 'in_flight'",
            [],
        )?;
        if recovered > 0 {
            tracing::warn!(recovered, "requeued reports left in flight by an interrupted drain");
        }
        Ok(recovered)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::StorageUnavailable("store lock poisoned".to_string()))
    }

    /// Persist a payload as a new pending record and return its id.
    pub fn enqueue(&self, payload: &ReportPayload) -> Result<ReportId> {
        let json = payload.to_json()?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO pending_reports (payload, created_at, status) VALUES (?1, ?2, ?3)",
            params![json, now_rfc3339(), ReportStatus::Pending.as_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Snapshot of all pending records, oldest first.
    pub fn list_pending(&self) -> Result<Vec<PendingReport>> {
        self.list_by_status(ReportStatus::Pending)
    }

    /// Snapshot of all dead-lettered records, oldest first.
    pub fn list_dead_letters(&self) -> Result<Vec<PendingReport>> {
        self.list_by_status(ReportStatus::DeadLetter)
    }

    fn list_by_status(&self, status: ReportStatus) -> Result<Vec<PendingReport>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE status = ?1 ORDER BY id"))?;
        let reports = stmt
            .query_map(params![status.as_str()], row_to_report)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(reports)
    }

    /// Get a record by id, in any state.
    pub fn get(&self, id: ReportId) -> Result<Option<PendingReport>> {
        let conn = self.conn()?;
        let report = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_report,
            )
            .optional()?;
        Ok(report)
    }

    /// Delete a record. Removing an absent id is a no-op.
    pub fn remove(&self, id: ReportId) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM pending_reports WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Delete every record. Operator/test reset only.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.conn()?.execute("DELETE FROM pending_reports", [])?;
        Ok(removed)
    }

    /// Mark a pending record as being submitted.
    pub fn mark_in_flight(&self, id: ReportId) -> Result<()> {
        self.set_status(id, ReportStatus::InFlight, None)
    }

    /// Return a record to `pending` (after a failed attempt).
    pub fn mark_pending(&self, id: ReportId) -> Result<()> {
        self.set_status(id, ReportStatus::Pending, None)
    }

    /// Quarantine a record the server rejected.
    pub fn dead_letter(&self, id: ReportId, reason: &str) -> Result<()> {
        self.set_status(id, ReportStatus::DeadLetter, Some(reason))
    }

    fn set_status(&self, id: ReportId, status: ReportStatus, reason: Option<&str>) -> Result<()> {
        let affected = self.conn()?.execute(
            "UPDATE pending_reports SET status = ?1, last_error = ?2 WHERE id = ?3",
            params![status.as_str(), reason, id],
        )?;
        if affected == 0 {
            return Err(Error::ReportNotFound(id));
        }
        Ok(())
    }

    /// Move a dead-lettered record back to `pending`.
    pub fn requeue(&self, id: ReportId) -> Result<()> {
        let affected = self.conn()?.execute(
            "UPDATE pending_reports SET status = 'pending', last_error = NULL
             WHERE id = ?1 AND status = 'dead_letter'",
            params![id],
        )?;
        if affected == 0 {
            return Err(Error::ReportNotFound(id));
        }
        Ok(())
    }

    /// Move every dead-lettered record back to `pending`.
    pub fn requeue_all(&self) -> Result<usize> {
        let affected = self.conn()?.execute(
            "UPDATE pending_reports SET status = 'pending', last_error = NULL
             WHERE status = 'dead_letter'",
            [],
        )?;
        Ok(affected)
    }

    /// Number of records in each state.
    pub fn counts(&self) -> Result<QueueCounts> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT status, COUNT(*) FROM pending_reports GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((parse_db::<ReportStatus>(&status, "status")?, count))
        })?;

        let mut counts = QueueCounts::default();
        for row in rows {
            let (status, count) = row?;
            let count = usize::try_from(count).unwrap_or(0);
            match status {
                ReportStatus::Pending => counts.pending = count,
                ReportStatus::InFlight => counts.in_flight = count,
                ReportStatus::DeadLetter => counts.dead_letter = count,
            }
        }
        Ok(counts)
    }

    /// Persist a finished drain summary, pruning old entries.
    pub fn record_drain(&self, summary: &DrainSummary) -> Result<()> {
        let json = serde_json::to_string(summary)?;
        let finished = summary
            .finished_at
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Micros, true);

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO drain_log (finished_at, summary) VALUES (?1, ?2)",
            params![finished, json],
        )?;
        conn.execute(
            "DELETE FROM drain_log WHERE id <= (SELECT MAX(id) FROM drain_log) - ?1",
            params![DRAIN_LOG_RETENTION],
        )?;
        Ok(())
    }

    /// The most recently recorded drain summary.
    pub fn last_drain(&self) -> Result<Option<DrainSummary>> {
        let json: Option<String> = self
            .conn()?
            .query_row(
                "SELECT summary FROM drain_log ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
