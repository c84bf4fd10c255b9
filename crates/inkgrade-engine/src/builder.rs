// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reference-set builder — offline batch job that walks a directory of
// machine-rendered glyph images, runs each through the processing pipeline,
// and persists the resulting profiles to the reference store.
//
// Layout on disk: `<glyph_dir>/<style>/<CODE>.png`, where CODE is a hex
// character code (the file stem names the glyph).

use std::path::{Path, PathBuf};

use inkgrade_core::error::{InkgradeError, Result};
use inkgrade_core::types::{CharacterCode, FontStyle, StrokeFeatureVector, StructuralFeatureVector};
use inkgrade_store::reference::ReferenceStore;
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::charmap;
use crate::pipeline::ProcessingPipeline;

/// One glyph image that could not be processed. The batch carries on past
/// individual failures and reports them at the end.
#[derive(Debug)]
pub struct BuildFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one batch build.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub built: usize,
    pub failures: Vec<BuildFailure>,
}

/// Walks glyph directories and populates the reference store.
///
/// Feature extraction fans out across a rayon pool; writes happen on the
/// calling thread because the store holds a single SQLite connection.
pub struct ReferenceSetBuilder<'a> {
    pipeline: &'a ProcessingPipeline,
    store: &'a ReferenceStore,
}

type ExtractedGlyph = (CharacterCode, StrokeFeatureVector, StructuralFeatureVector);

impl<'a> ReferenceSetBuilder<'a> {
    pub fn new(pipeline: &'a ProcessingPipeline, store: &'a ReferenceStore) -> Self {
        Self { pipeline, store }
    }

    /// Build profiles for every glyph image under `<glyph_dir>/<style>/`.
    ///
    /// Per-image failures (undecodable files, bad file names) are collected
    /// in the report; store errors abort the batch.
    #[instrument(skip_all, fields(dir = %glyph_dir.as_ref().display(), style = %style))]
    pub fn build_style(&self, glyph_dir: impl AsRef<Path>, style: FontStyle) -> Result<BuildReport> {
        let style_dir = glyph_dir.as_ref().join(style.as_str());
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&style_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .collect();
        paths.sort();
        info!(count = paths.len(), "building reference profiles");

        // Extraction fans out; the closure captures only the pipeline, since
        // the store's SQLite connection cannot cross threads.
        let pipeline = self.pipeline;
        let results: Vec<(PathBuf, Result<ExtractedGlyph>)> = paths
            .par_iter()
            .map(|path| (path.clone(), extract_one(pipeline, path)))
            .collect();

        let mut report = BuildReport::default();
        for (path, extracted) in results {
            match extracted {
                Ok((code, stroke, structure)) => {
                    let character = charmap::lookup(&code).or_else(|| code.to_char());
                    self.store.put(&code, style, &stroke, &structure, character)?;
                    report.built += 1;
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "glyph skipped");
                    report.failures.push(BuildFailure {
                        path,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            built = report.built,
            failed = report.failures.len(),
            "reference build finished"
        );
        Ok(report)
    }

    /// Build all three styles in sequence, merging reports.
    pub fn build_all(&self, glyph_dir: impl AsRef<Path>) -> Result<BuildReport> {
        let mut merged = BuildReport::default();
        for style in FontStyle::ALL {
            let report = self.build_style(glyph_dir.as_ref(), style)?;
            merged.built += report.built;
            merged.failures.extend(report.failures);
        }
        Ok(merged)
    }

}

fn extract_one(pipeline: &ProcessingPipeline, path: &Path) -> Result<ExtractedGlyph> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| InkgradeError::CharacterCode(path.display().to_string()))?;
    let code = CharacterCode::parse(stem)?;
    let processed = pipeline.process_path(path)?;
    Ok((code, processed.stroke, processed.structure))
}
