// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Similarity scoring — compares a submission's feature vectors against a
// stored reference profile, and blends in the artistic score when both base
// scores clear the gate.

use inkgrade_core::error::Result;
use inkgrade_core::types::{
    ArtisticFeatureVector, CellDetails, CharacterCode, DetailPair, EvaluationDetails,
    EvaluationResult, FontStyle, ReferenceProfile, StrokeDetails, StrokeFeatureVector,
    StructuralFeatureVector,
};
use inkgrade_core::EngineConfig;
use inkgrade_store::reference::ReferenceStore;
use inkgrade_vision::ArtEvaluator;
use tracing::{debug, instrument};

use crate::pipeline::ProcessingPipeline;

// Stroke sub-score weights (mean width, width uniformity, mean curvature).
const W_WIDTH: f64 = 0.4;
const W_UNIFORMITY: f64 = 0.3;
const W_CURVATURE: f64 = 0.3;

// Per-cell structural weights (density, centroid offset).
const W_DENSITY: f64 = 0.6;
const W_OFFSET: f64 = 0.4;

// Base fusion weights (stroke, structure).
const W_STROKE: f64 = 0.6;
const W_STRUCTURE: f64 = 0.4;

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Scores submissions against reference profiles for one font style.
///
/// Borrows the store so a single connection can serve many evaluations; the
/// evaluator itself holds no mutable state.
pub struct Evaluator<'a> {
    store: &'a ReferenceStore,
    style: FontStyle,
    config: EngineConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(store: &'a ReferenceStore, style: FontStyle) -> Self {
        Self::with_config(store, style, EngineConfig::default())
    }

    pub fn with_config(store: &'a ReferenceStore, style: FontStyle, config: EngineConfig) -> Self {
        Self {
            store,
            style,
            config,
        }
    }

    /// Compare a submission's features against the stored profile for
    /// `code`. Returns `Ok(None)` when no profile exists for the code in
    /// this evaluator's style.
    ///
    /// The result's `art` slot is left empty; callers that want the
    /// artistic blend check [`Evaluator::art_gate_passed`] and then call
    /// [`Evaluator::blend_art`].
    #[instrument(skip(self, stroke, structure), fields(code = %code, style = %self.style))]
    pub fn evaluate(
        &self,
        stroke: &StrokeFeatureVector,
        structure: &StructuralFeatureVector,
        code: &CharacterCode,
    ) -> Result<Option<EvaluationResult>> {
        let Some(profile) = self.store.get(code, self.style)? else {
            debug!("no reference profile for code");
            return Ok(None);
        };
        Ok(Some(self.score_against(stroke, structure, &profile)))
    }

    /// Score a submission against an already-fetched profile.
    pub fn score_against(
        &self,
        stroke: &StrokeFeatureVector,
        structure: &StructuralFeatureVector,
        profile: &ReferenceProfile,
    ) -> EvaluationResult {
        let stroke_score = self.stroke_similarity(stroke, &profile.stroke);
        let structure_score = self.structure_similarity(structure, &profile.structure);
        let total_score = W_STROKE * stroke_score + W_STRUCTURE * structure_score;

        debug!(stroke_score, structure_score, total_score, "base scores");

        EvaluationResult {
            stroke_score,
            structure_score,
            total_score,
            art: None,
            details: Self::details(stroke, structure, profile),
        }
    }

    /// Weighted stroke similarity. Each term is a relative-difference
    /// similarity; the reference value in the denominator is floored (1.0
    /// for widths, 0.1 for curvature) so near-zero references cannot explode
    /// the ratio. Only the composite is clamped: a strongly negative term
    /// drags the whole score to zero rather than being floored away.
    fn stroke_similarity(&self, user: &StrokeFeatureVector, reference: &StrokeFeatureVector) -> f64 {
        let width_sim =
            1.0 - (user.width_mean - reference.width_mean).abs() / reference.width_mean.max(1.0);
        let width_uniformity = 1.0 - user.width_std / reference.width_std.max(1.0);
        let curvature_sim = 1.0
            - (user.curvature_mean - reference.curvature_mean).abs()
                / reference.curvature_mean.max(0.1);

        clamp01(W_WIDTH * width_sim + W_UNIFORMITY * width_uniformity + W_CURVATURE * curvature_sim)
    }

    /// Mean per-cell similarity over the 3×3 grid. Densities and offsets
    /// both live in [0, 1]-scale spaces, so absolute differences compare
    /// directly.
    fn structure_similarity(
        &self,
        user: &StructuralFeatureVector,
        reference: &StructuralFeatureVector,
    ) -> f64 {
        let sum: f64 = user
            .cells()
            .iter()
            .zip(reference.cells())
            .map(|(u, r)| {
                let density_sim = 1.0 - (u.density - r.density).abs();
                let offset_sim = 1.0 - (u.center_offset - r.center_offset).abs();
                W_DENSITY * clamp01(density_sim) + W_OFFSET * clamp01(offset_sim)
            })
            .sum();
        clamp01(sum / 9.0)
    }

    fn details(
        stroke: &StrokeFeatureVector,
        structure: &StructuralFeatureVector,
        profile: &ReferenceProfile,
    ) -> EvaluationDetails {
        let pair = |user: f64, reference: f64| DetailPair { user, reference };
        EvaluationDetails {
            stroke: StrokeDetails {
                width_mean: pair(stroke.width_mean, profile.stroke.width_mean),
                width_std: pair(stroke.width_std, profile.stroke.width_std),
                curvature_mean: pair(stroke.curvature_mean, profile.stroke.curvature_mean),
            },
            structure: std::array::from_fn(|i| {
                let u = structure.cell(i);
                let r = profile.structure.cell(i);
                CellDetails {
                    density: pair(u.density, r.density),
                    center_offset: pair(u.center_offset, r.center_offset),
                }
            }),
        }
    }

    /// Whether the base result is good enough to earn artistic evaluation.
    /// Both base scores must clear the gate threshold.
    pub fn art_gate_passed(&self, result: &EvaluationResult) -> bool {
        result.stroke_score > self.config.art_gate_threshold
            && result.structure_score > self.config.art_gate_threshold
    }

    /// Fold an artistic evaluation into the result's total.
    pub fn blend_art(&self, result: &mut EvaluationResult, art: ArtisticFeatureVector) {
        let w = self.config.art_blend_weight;
        result.total_score = clamp01((1.0 - w) * result.total_score + w * art.art_score);
        result.art = Some(art);
    }
}

/// End-to-end evaluation of one submission: preprocess and extract features
/// (cache-backed), score against the reference, and run the gated artistic
/// pass. `Ok(None)` means no reference profile exists for the code.
#[instrument(skip_all, fields(code = %code))]
pub fn evaluate_submission(
    pipeline: &ProcessingPipeline,
    evaluator: &Evaluator<'_>,
    art_evaluator: &ArtEvaluator,
    image_bytes: &[u8],
    code: &CharacterCode,
) -> Result<Option<EvaluationResult>> {
    let processed = pipeline.process_bytes(image_bytes)?;
    let Some(mut result) = evaluator.evaluate(&processed.stroke, &processed.structure, code)? else {
        return Ok(None);
    };

    if evaluator.art_gate_passed(&result) {
        let gray = pipeline.decode_grayscale(image_bytes)?;
        let art = art_evaluator.evaluate(&processed.raster, Some(&gray));
        evaluator.blend_art(&mut result, art);
        debug!(total = result.total_score, "artistic blend applied");
    }

    Ok(Some(result))
}
