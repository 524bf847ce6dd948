use crate::inventory::InputReport;
use rusqlite::{Connection, Result as SqliteResult, params};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

pub struct ReportStore {
    conn: Connection,
}

#[derive(Debug, Clone)]
pub struct StoredReport {
    pub uid: String,
    pub message_id: String,
    pub user: String,
    pub report: InputReport,
    pub is_processed: bool,
}

impl ReportStore {
    /// Open (or create) the report store at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P) -> SqliteResult<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS reports (
                uid TEXT PRIMARY KEY,
                message_id TEXT NOT NULL,
                user TEXT NOT NULL,
                sender TEXT NOT NULL,
                received_time TEXT NOT NULL,
                body TEXT,
                is_processed INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_reports_is_processed ON reports(is_processed)",
            [],
        )?;

        info!("Report store initialized");
        Ok(Self { conn })
    }

    /// Stable id from message id, received time and mailbox user.
    pub fn generate_uid(message_id: &str, received_time: &str, user: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(message_id.as_bytes());
        hasher.update(received_time.as_bytes());
        hasher.update(user.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Insert a report, or refresh its content if it is already stored.
    /// The processed flag of an existing row is left alone.
    pub fn upsert_report(&self, stored: &StoredReport) -> SqliteResult<()> {
        self.conn.execute(
            "INSERT INTO reports
                (uid, message_id, user, sender, received_time, body, is_processed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(uid) DO UPDATE SET
                sender = excluded.sender,
                received_time = excluded.received_time,
                body = excluded.body",
            params![
                stored.uid,
                stored.message_id,
                stored.user,
                stored.report.sender,
                stored.report.received_time,
                stored.report.body,
                stored.is_processed,
            ],
        )?;
        info!(uid = %stored.uid, "Report stored");
        Ok(())
    }

    /// Reports not yet counted, oldest first.
    pub fn get_unprocessed_reports(&self) -> SqliteResult<Vec<StoredReport>> {
        let mut stmt = self.conn.prepare(
            "SELECT uid, message_id, user, sender, received_time, body, is_processed
             FROM reports
             WHERE is_processed = 0
             ORDER BY created_at, rowid",
        )?;

        let reports = stmt.query_map([], |row| {
            Ok(StoredReport {
                uid: row.get(0)?,
                message_id: row.get(1)?,
                user: row.get(2)?,
                report: InputReport {
                    sender: row.get(3)?,
                    received_time: row.get(4)?,
                    body: row.get(5)?,
                },
                is_processed: row.get(6)?,
            })
        })?;

        reports.collect()
    }

    pub fn mark_report_as_processed(&self, uid: &str) -> SqliteResult<()> {
        self.conn.execute(
            "UPDATE reports SET is_processed = 1 WHERE uid = ?1",
            params![uid],
        )?;
        info!(uid = %uid, "Report marked as processed");
        Ok(())
    }

    /// (total, processed)
    pub fn get_counts(&self) -> SqliteResult<(usize, usize)> {
        let total: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;

        let processed: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM reports WHERE is_processed = 1",
            [],
            |row| row.get(0),
        )?;

        Ok((total, processed))
    }
}
