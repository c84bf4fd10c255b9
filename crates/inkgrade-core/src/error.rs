// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Inkgrade.
//
// "Reference profile not found" is intentionally not an error variant:
// lookups return `Option` and callers branch on it (a missing reference is
// a normal outcome, not a failure).

use thiserror::Error;

/// Top-level error type for all Inkgrade operations.
#[derive(Debug, Error)]
pub enum InkgradeError {
    // -- Image loading / preprocessing --
    #[error("failed to load image: {0}")]
    Load(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Domain validation --
    #[error("invalid character code: {0}")]
    CharacterCode(String),

    #[error("unknown font style: {0}")]
    FontStyle(String),

    #[error("invalid canonical raster: expected {expected} pixels, got {actual}")]
    RasterSize { expected: usize, actual: usize },

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, InkgradeError>;
