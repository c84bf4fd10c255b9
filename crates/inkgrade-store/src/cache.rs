// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Feature cache — content-addressed store of preprocessed rasters and their
// feature vectors, keyed by the SHA-256 hex digest of the raw image bytes.
//
// The cache is advisory: a corrupt or unreadable entry is a miss, never an
// error, and writers simply overwrite. Keys derive deterministically from
// the input bytes, so concurrent writers to the same key produce
// byte-identical values and last-writer-wins is safe.

use std::fs;
use std::path::{Path, PathBuf};

use inkgrade_core::error::Result;
use inkgrade_core::types::{CanonicalRaster, StrokeFeatureVector, StructuralFeatureVector};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

/// SHA-256 hex digest of `data` — the cache key for an image.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Everything recomputation of an image would produce: the canonical raster
/// and both feature vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub raster: CanonicalRaster,
    pub stroke: StrokeFeatureVector,
    pub structure: StructuralFeatureVector,
}

/// Directory of JSON cache entries, one file per content hash.
pub struct FeatureCache {
    dir: PathBuf,
}

impl FeatureCache {
    /// Open (and create, if needed) the cache directory.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        debug!("feature cache opened");
        Ok(Self {
            dir: dir.as_ref().to_owned(),
        })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Look up an entry by key. Missing, unreadable, and unparsable entries
    /// all read as `None`; a damaged file is recomputed and overwritten by
    /// the caller, never surfaced as an error.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(_) => return None,
        };
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(key, %err, "corrupt cache entry treated as a miss");
                None
            }
        }
    }

    /// Write (or overwrite) an entry. Failures are surfaced so the caller
    /// can decide whether a cold cache is acceptable — the pipeline logs
    /// and carries on.
    pub fn put(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let json = serde_json::to_vec(entry)?;
        fs::write(self.entry_path(key), json)?;
        debug!(key, "cache entry written");
        Ok(())
    }
}
