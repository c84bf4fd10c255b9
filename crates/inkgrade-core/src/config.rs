// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunable settings for the scoring engine.
///
/// The canonical raster size itself is fixed at 128×128 (an invariant of
/// [`crate::CanonicalRaster`], not a setting) — reference profiles are only
/// comparable to submissions preprocessed at the same size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Median filter radius used for denoising (1 = 3×3 window).
    pub median_radius: u32,
    /// Adaptive threshold neighbourhood radius (5 = 11×11 window).
    pub threshold_block_radius: u32,
    /// Constant subtracted from the local mean when binarizing.
    pub threshold_offset: i32,
    /// Both stroke and structure scores must exceed this before artistic
    /// evaluation is worth running.
    pub art_gate_threshold: f64,
    /// Weight of the artistic score when blended into the total
    /// (total = (1 - w) * total + w * art).
    pub art_blend_weight: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            median_radius: 1,
            threshold_block_radius: 5,
            threshold_offset: 2,
            art_gate_threshold: 0.5,
            art_blend_weight: 0.3,
        }
    }
}
