// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Processing pipeline — preprocessing plus feature extraction behind the
// content-addressed cache, so repeated evaluation of the same image bytes
// skips recomputation.

use std::path::Path;

use image::GrayImage;
use inkgrade_core::error::Result;
use inkgrade_core::types::{CanonicalRaster, StrokeFeatureVector, StructuralFeatureVector};
use inkgrade_store::cache::{CacheEntry, FeatureCache, content_hash};
use inkgrade_vision::{FeatureExtractor, Preprocessor};
use tracing::{debug, instrument, warn};

/// Output of one pipeline run: the canonical raster and both feature
/// vectors, whether freshly computed or served from cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pub raster: CanonicalRaster,
    pub stroke: StrokeFeatureVector,
    pub structure: StructuralFeatureVector,
}

impl From<CacheEntry> for ProcessedImage {
    fn from(entry: CacheEntry) -> Self {
        Self {
            raster: entry.raster,
            stroke: entry.stroke,
            structure: entry.structure,
        }
    }
}

/// Cache-wrapped preprocess + extract pipeline.
///
/// Shared-state-free apart from the cache directory, so one pipeline can be
/// borrowed across worker threads for batch processing.
pub struct ProcessingPipeline {
    preprocessor: Preprocessor,
    extractor: FeatureExtractor,
    cache: FeatureCache,
}

impl ProcessingPipeline {
    pub fn new(cache_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            preprocessor: Preprocessor::new(),
            extractor: FeatureExtractor::new(),
            cache: FeatureCache::open(cache_dir)?,
        })
    }

    pub fn with_config(
        cache_dir: impl AsRef<Path>,
        config: &inkgrade_core::EngineConfig,
    ) -> Result<Self> {
        Ok(Self {
            preprocessor: Preprocessor::with_config(config),
            extractor: FeatureExtractor::new(),
            cache: FeatureCache::open(cache_dir)?,
        })
    }

    /// Process raw encoded image bytes, consulting the cache first.
    ///
    /// A hit returns exactly what a fresh computation would produce (keys
    /// are content hashes and extraction is deterministic). A failed
    /// write-back only costs the next caller a recomputation, so it is
    /// logged and swallowed.
    #[instrument(skip_all, fields(data_len = data.len()))]
    pub fn process_bytes(&self, data: &[u8]) -> Result<ProcessedImage> {
        let key = content_hash(data);
        if let Some(entry) = self.cache.get(&key) {
            debug!(key, "cache hit");
            return Ok(entry.into());
        }

        let raster = self.preprocessor.preprocess_bytes(data)?;
        let (stroke, structure) = self.extractor.extract(&raster);

        let entry = CacheEntry {
            raster: raster.clone(),
            stroke,
            structure,
        };
        if let Err(err) = self.cache.put(&key, &entry) {
            warn!(key, %err, "cache write failed; continuing uncached");
        }

        Ok(ProcessedImage {
            raster,
            stroke,
            structure,
        })
    }

    /// Process an image file, consulting the cache first.
    pub fn process_path(&self, path: impl AsRef<Path>) -> Result<ProcessedImage> {
        let data = std::fs::read(path)?;
        self.process_bytes(&data)
    }

    /// Decode the original grayscale of a submission (for ink-gradient
    /// analysis) without binarizing it.
    pub fn decode_grayscale(&self, data: &[u8]) -> Result<GrayImage> {
        self.preprocessor.decode_grayscale(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// PNG bytes of a white page with a dark bar.
    fn bar_png() -> Vec<u8> {
        let mut img = GrayImage::from_pixel(200, 200, Luma([235u8]));
        for y in 90..104 {
            for x in 20..180 {
                img.put_pixel(x, y, Luma([25u8]));
            }
        }
        let mut encoded = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut encoded),
            image::ImageFormat::Png,
        )
        .unwrap();
        encoded
    }

    #[test]
    fn cache_hit_equals_fresh_computation() {
        let dir = tempfile::tempdir().unwrap();
        let data = bar_png();

        let cold = ProcessingPipeline::new(dir.path().join("a")).unwrap();
        let fresh = cold.process_bytes(&data).unwrap();

        let warm = ProcessingPipeline::new(dir.path().join("b")).unwrap();
        let first = warm.process_bytes(&data).unwrap();
        let second = warm.process_bytes(&data).unwrap();

        assert_eq!(first, second);
        assert_eq!(fresh, second);
    }

    #[test]
    fn corrupt_cache_entry_recomputes() {
        let dir = tempfile::tempdir().unwrap();
        let data = bar_png();
        let pipeline = ProcessingPipeline::new(dir.path()).unwrap();

        let fresh = pipeline.process_bytes(&data).unwrap();

        // Damage the entry on disk; the next call must recompute, not fail.
        let key = content_hash(&data);
        std::fs::write(dir.path().join(format!("{key}.json")), b"garbage").unwrap();

        let recomputed = pipeline.process_bytes(&data).unwrap();
        assert_eq!(fresh, recomputed);
    }

    #[test]
    fn undecodable_bytes_surface_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ProcessingPipeline::new(dir.path()).unwrap();
        let result = pipeline.process_bytes(b"not an image at all");
        assert!(matches!(
            result,
            Err(inkgrade_core::InkgradeError::Load(_))
        ));
    }

    #[test]
    fn process_path_matches_process_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let data = bar_png();
        let img_path = dir.path().join("sample.png");
        std::fs::write(&img_path, &data).unwrap();

        let pipeline = ProcessingPipeline::new(dir.path().join("cache")).unwrap();
        let from_path = pipeline.process_path(&img_path).unwrap();
        let from_bytes = pipeline.process_bytes(&data).unwrap();
        assert_eq!(from_path, from_bytes);
    }
}
