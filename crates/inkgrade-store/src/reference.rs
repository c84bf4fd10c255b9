// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reference store — SQLite-backed lookup of persisted feature profiles by
// (character code, font style).
//
// Schema:
//   standard_chars(
//     char_code          TEXT NOT NULL,   -- canonical 4-hex-digit code
//     font_style         TEXT NOT NULL,   -- "light" | "medium" | "regular"
//     character          TEXT,            -- the rendered character, if known
//     stroke_features    TEXT NOT NULL,   -- JSON StrokeFeatureVector
//     structure_features TEXT NOT NULL,   -- JSON StructuralFeatureVector
//     PRIMARY KEY (char_code, font_style)
//   )

use std::path::Path;

use inkgrade_core::error::{InkgradeError, Result};
use inkgrade_core::types::{
    CharacterCode, FontStyle, ReferenceProfile, StrokeFeatureVector, StructuralFeatureVector,
};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, instrument};

/// Convert a `rusqlite::Error` into an `InkgradeError::Database`.
fn db_err(e: rusqlite::Error) -> InkgradeError {
    InkgradeError::Database(e.to_string())
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS standard_chars (
    char_code          TEXT NOT NULL,
    font_style         TEXT NOT NULL,
    character          TEXT,
    stroke_features    TEXT NOT NULL,
    structure_features TEXT NOT NULL,
    PRIMARY KEY (char_code, font_style)
);";

/// Read side of the evaluation path and write side of the offline
/// reference builder. Profiles are immutable once written (`put` replaces
/// wholesale); a missing profile is a normal outcome and surfaces as
/// `Ok(None)`, never as an error.
pub struct ReferenceStore {
    conn: Connection,
}

impl ReferenceStore {
    /// Open (or create) the reference database at `path`.
    ///
    /// WAL mode is enabled for better concurrent-read performance.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE).map_err(db_err)?;
        debug!("reference store opened");
        Ok(Self { conn })
    }

    /// Open an in-memory reference database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE).map_err(db_err)?;
        debug!("in-memory reference store opened");
        Ok(Self { conn })
    }

    /// Insert or replace the profile for `(code, style)`.
    ///
    /// Used only by the offline builder, never by the evaluation path.
    #[instrument(skip(self, stroke, structure), fields(code = %code, style = %style))]
    pub fn put(
        &self,
        code: &CharacterCode,
        style: FontStyle,
        stroke: &StrokeFeatureVector,
        structure: &StructuralFeatureVector,
        character: Option<char>,
    ) -> Result<()> {
        let stroke_json = serde_json::to_string(stroke)?;
        let structure_json = serde_json::to_string(structure)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO standard_chars
                 (char_code, font_style, character, stroke_features, structure_features)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    code.as_str(),
                    style.as_str(),
                    character.map(String::from),
                    stroke_json,
                    structure_json
                ],
            )
            .map_err(db_err)?;
        debug!("reference profile stored");
        Ok(())
    }

    /// Fetch the profile for `(code, style)`, or `None` when absent.
    pub fn get(&self, code: &CharacterCode, style: FontStyle) -> Result<Option<ReferenceProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT character, stroke_features, structure_features
                 FROM standard_chars
                 WHERE char_code = ?1 AND font_style = ?2",
                params![code.as_str(), style.as_str()],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(db_err)?;

        let Some((character, stroke_json, structure_json)) = row else {
            return Ok(None);
        };

        let stroke: StrokeFeatureVector = serde_json::from_str(&stroke_json)?;
        let structure: StructuralFeatureVector = serde_json::from_str(&structure_json)?;
        Ok(Some(ReferenceProfile {
            character_code: code.clone(),
            font_style: style,
            character: character.and_then(|s| s.chars().next()),
            stroke,
            structure,
        }))
    }

    /// Number of stored profiles across all styles.
    pub fn count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM standard_chars", [], |row| row.get(0))
            .map_err(db_err)
    }
}
