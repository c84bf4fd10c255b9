// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Submission log — append-only SQLite record of every evaluated submission.
//
// Schema:
//   user_submissions(
//     id         INTEGER PRIMARY KEY AUTOINCREMENT,
//     timestamp  TEXT NOT NULL,   -- RFC 3339
//     file_hash  TEXT NOT NULL,   -- SHA-256 hex digest of the image bytes
//     char_code  TEXT NOT NULL,   -- canonical 4-hex-digit code
//     score      REAL NOT NULL,   -- final total score in [0, 1]
//     features   TEXT             -- optional JSON feature snapshot
//   )

use std::path::Path;

use chrono::Utc;
use inkgrade_core::error::{InkgradeError, Result};
use inkgrade_core::types::CharacterCode;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

fn db_err(e: rusqlite::Error) -> InkgradeError {
    InkgradeError::Database(e.to_string())
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS user_submissions (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp  TEXT NOT NULL,
    file_hash  TEXT NOT NULL,
    char_code  TEXT NOT NULL,
    score      REAL NOT NULL,
    features   TEXT
);";

/// A single logged submission, used for queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionEntry {
    pub id: i64,
    pub timestamp: String,
    pub file_hash: String,
    pub char_code: String,
    pub score: f64,
    pub features: Option<String>,
}

/// Append-only log of evaluated submissions backed by a SQLite database.
pub struct SubmissionLog {
    conn: Connection,
}

impl SubmissionLog {
    /// Open (or create) the submission database at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE).map_err(db_err)?;
        debug!("submission log opened");
        Ok(Self { conn })
    }

    /// Open an in-memory submission log (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE).map_err(db_err)?;
        debug!("in-memory submission log opened");
        Ok(Self { conn })
    }

    /// Record an evaluated submission.
    ///
    /// `file_hash` should be the SHA-256 hex digest of the submitted image
    /// bytes (the same key the feature cache uses).
    #[instrument(skip(self, features), fields(%file_hash, code = %code, score))]
    pub fn record(
        &self,
        file_hash: &str,
        code: &CharacterCode,
        score: f64,
        features: Option<&str>,
    ) -> Result<()> {
        let timestamp = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO user_submissions (timestamp, file_hash, char_code, score, features)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![timestamp, file_hash, code.as_str(), score, features],
            )
            .map_err(db_err)?;
        debug!("submission recorded");
        Ok(())
    }

    /// All entries for one character code, oldest first.
    pub fn entries_for_code(&self, code: &CharacterCode) -> Result<Vec<SubmissionEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, file_hash, char_code, score, features
                 FROM user_submissions
                 WHERE char_code = ?1
                 ORDER BY id ASC",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![code.as_str()], |row| {
                Ok(SubmissionEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    file_hash: row.get(2)?,
                    char_code: row.get(3)?,
                    score: row.get(4)?,
                    features: row.get(5)?,
                })
            })
            .map_err(db_err)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(db_err)?);
        }
        Ok(entries)
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent(&self, limit: u32) -> Result<Vec<SubmissionEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, file_hash, char_code, score, features
                 FROM user_submissions
                 ORDER BY id DESC
                 LIMIT ?1",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(SubmissionEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    file_hash: row.get(2)?,
                    char_code: row.get(3)?,
                    score: row.get(4)?,
                    features: row.get(5)?,
                })
            })
            .map_err(db_err)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(db_err)?);
        }
        Ok(entries)
    }

    /// Total number of logged submissions.
    pub fn count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM user_submissions", [], |row| row.get(0))
            .map_err(db_err)
    }
}
