// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artistic evaluator — pen pressure, stroke-tip sharpness, stroke fluency,
// and ink-gradient sub-scores for a canonical raster, with a feedback
// summary assembled from fixed thresholds on the sub-scores.

use image::imageops::FilterType;
use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use inkgrade_core::types::{ArtisticFeatureVector, CanonicalRaster};
use tracing::{debug, instrument};

use crate::convert::raster_to_gray;
use crate::curvature::{contour_curvature, external_contours};
use crate::skeleton::{skeleton_endpoints, zhang_suen_thin};
use crate::{half_stroke_widths, mean_std};

/// Sub-score fusion weights.
const W_PRESSURE: f64 = 0.35;
const W_TIPS: f64 = 0.25;
const W_FLUENCY: f64 = 0.20;
const W_GRADIENT: f64 = 0.20;

/// Evaluates artistic execution of a handwritten character.
///
/// Works on the canonical binary raster; the ink-gradient sub-score
/// additionally needs the original grayscale source (shading information is
/// destroyed by binarization) and reads 0 without it.
pub struct ArtEvaluator;

impl ArtEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Compute all four sub-scores and their weighted fusion.
    ///
    /// The canonical raster is strictly binary with ink as foreground by
    /// construction, which satisfies the defensive re-binarization the
    /// analysis requires.
    #[instrument(skip_all, fields(has_gray = original_gray.is_some()))]
    pub fn evaluate(
        &self,
        binary: &CanonicalRaster,
        original_gray: Option<&GrayImage>,
    ) -> ArtisticFeatureVector {
        let image = raster_to_gray(binary);

        let pen_pressure = self.pen_pressure(&image);
        let stroke_tips = self.stroke_tips(&image);
        let stroke_fluency = self.stroke_fluency(&image);
        let ink_gradient = match original_gray {
            Some(gray) => self.ink_gradient(gray, &image),
            None => 0.0,
        };

        let art_score = W_PRESSURE * pen_pressure
            + W_TIPS * stroke_tips
            + W_FLUENCY * stroke_fluency
            + W_GRADIENT * ink_gradient;

        debug!(
            pen_pressure,
            stroke_tips, stroke_fluency, ink_gradient, art_score, "artistic evaluation complete"
        );

        ArtisticFeatureVector {
            pen_pressure,
            stroke_tips,
            stroke_fluency,
            ink_gradient,
            art_score,
            feedback: feedback_summary(pen_pressure, stroke_tips, stroke_fluency, ink_gradient),
        }
    }

    /// Pen pressure: does stroke width vary enough to suggest deliberate
    /// pressure changes? Ratio of the width spread to half the mean width,
    /// capped at 1. Zero for an inkless image.
    fn pen_pressure(&self, image: &GrayImage) -> f64 {
        let widths = half_stroke_widths(image);
        if widths.is_empty() {
            return 0.0;
        }
        let (width_mean, width_std) = mean_std(&widths);
        (width_std / (width_mean * 0.5)).min(1.0)
    }

    /// Stroke-tip sharpness: at each skeleton endpoint, the peak Sobel
    /// gradient magnitude inside an 11×11 window of the binary raster,
    /// scaled by 1/100 and capped at 1; averaged over endpoints. Zero when
    /// the skeleton has no endpoints.
    fn stroke_tips(&self, image: &GrayImage) -> f64 {
        let skeleton = zhang_suen_thin(image);
        let endpoints = skeleton_endpoints(&skeleton);
        if endpoints.is_empty() {
            return 0.0;
        }

        let (width, height) = image.dimensions();
        let mut tip_scores = Vec::new();
        for (x, y) in endpoints {
            let x0 = x.saturating_sub(5);
            let y0 = y.saturating_sub(5);
            let x1 = (x + 6).min(width);
            let y1 = (y + 6).min(height);
            if x1 <= x0 || y1 <= y0 {
                continue;
            }
            let roi = image::imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image();

            let max_grad = sobel_magnitude(&roi)
                .into_iter()
                .fold(0.0f64, f64::max);
            tip_scores.push((max_grad / 100.0).min(1.0));
        }

        if tip_scores.is_empty() {
            0.0
        } else {
            tip_scores.iter().sum::<f64>() / tip_scores.len() as f64
        }
    }

    /// Stroke fluency: low curvature variance along a contour means a
    /// smooth, controlled stroke. Contours shorter than 10 points carry too
    /// little shape to judge and are skipped; zero when none qualify.
    fn stroke_fluency(&self, image: &GrayImage) -> f64 {
        let mut contour_scores = Vec::new();
        for contour in external_contours(image) {
            if contour.len() < 10 {
                continue;
            }
            let curvature = contour_curvature(&contour);
            if curvature.is_empty() {
                continue;
            }
            let (_, curvature_std) = mean_std(&curvature);
            contour_scores.push((1.0 / (curvature_std + 0.1)).min(1.0));
        }

        if contour_scores.is_empty() {
            0.0
        } else {
            contour_scores.iter().sum::<f64>() / contour_scores.len() as f64
        }
    }

    /// Ink gradient: tonal layering inside the stroke region of the
    /// original grayscale. Combines the fraction of masked pixels with a
    /// significant normalized gradient (0.6 weight) with the local
    /// coherence of those gradients (0.4 weight), capped at 1.
    fn ink_gradient(&self, gray: &GrayImage, mask: &GrayImage) -> f64 {
        // Align the mask with the grayscale source before masking.
        let mask = if mask.dimensions() != gray.dimensions() {
            let (gw, gh) = gray.dimensions();
            let resized = image::imageops::resize(mask, gw, gh, FilterType::Triangle);
            rebinarize(&resized)
        } else {
            mask.clone()
        };

        let (width, height) = gray.dimensions();
        let mut stroke_area = GrayImage::new(width, height);
        let mut mask_count = 0u64;
        for (x, y, p) in mask.enumerate_pixels() {
            if p.0[0] > 0 {
                mask_count += 1;
                stroke_area.put_pixel(x, y, *gray.get_pixel(x, y));
            }
        }

        let mut grad = sobel_magnitude(&stroke_area);
        let max = grad.iter().copied().fold(0.0f64, f64::max);
        if max > 0.0 {
            for g in &mut grad {
                *g /= max;
            }
        }

        let strong = grad.iter().filter(|&&g| g > 0.3).count() as f64;
        let effective_gradient = strong / (mask_count as f64 + 1e-5);
        let coherence = gradient_coherence(&grad, width as usize, height as usize);

        (0.6 * effective_gradient + 0.4 * coherence).min(1.0)
    }
}

impl Default for ArtEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Threshold-driven feedback text. Each weak sub-score contributes one
/// remark; an empty set becomes the positive default.
fn feedback_summary(
    pen_pressure: f64,
    stroke_tips: f64,
    stroke_fluency: f64,
    ink_gradient: f64,
) -> String {
    let mut remarks = Vec::new();
    if pen_pressure < 0.5 {
        remarks.push("pen pressure variation is weak");
    }
    if stroke_tips < 0.5 {
        remarks.push("stroke tips lack sharpness");
    }
    if stroke_fluency < 0.5 {
        remarks.push("strokes could flow more smoothly");
    }
    if ink_gradient < 0.4 {
        remarks.push("ink tone is flat, lacking layered shading");
    }

    if remarks.is_empty() {
        "good artistic execution overall".to_owned()
    } else {
        remarks.join("; ")
    }
}

/// Per-pixel Sobel gradient magnitude as f64, row-major.
fn sobel_magnitude(image: &GrayImage) -> Vec<f64> {
    let hx = horizontal_sobel(image);
    let hy = vertical_sobel(image);
    hx.pixels()
        .zip(hy.pixels())
        .map(|(gx, gy)| {
            let gx = gx.0[0] as f64;
            let gy = gy.0[0] as f64;
            (gx * gx + gy * gy).sqrt()
        })
        .collect()
}

/// Fraction of significant-gradient pixels (> 0.3, normalized) whose 3×3
/// neighbourhood has a low magnitude spread (< 0.2) — locally consistent
/// gradients read as deliberate shading rather than noise. Zero when the
/// image is smaller than 3×3 or no pixel qualifies.
fn gradient_coherence(grad: &[f64], width: usize, height: usize) -> f64 {
    if width < 3 || height < 3 {
        return 0.0;
    }

    let mut coherent = 0u64;
    let mut count = 0u64;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if grad[y * width + x] <= 0.3 {
                continue;
            }
            count += 1;
            let mut local = [0.0f64; 9];
            for (k, (dy, dx)) in (-1i64..=1)
                .flat_map(|dy| (-1i64..=1).map(move |dx| (dy, dx)))
                .enumerate()
            {
                local[k] = grad[(y as i64 + dy) as usize * width + (x as i64 + dx) as usize];
            }
            let (_, std) = mean_std(&local);
            if std < 0.2 {
                coherent += 1;
            }
        }
    }

    if count > 0 {
        coherent as f64 / count as f64
    } else {
        0.0
    }
}

/// Threshold at 127 after interpolated resizing.
fn rebinarize(image: &GrayImage) -> GrayImage {
    let mut out = GrayImage::new(image.width(), image.height());
    for (x, y, p) in image.enumerate_pixels() {
        out.put_pixel(x, y, Luma([if p.0[0] > 127 { 255 } else { 0 }]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::gray_to_raster;

    fn rect_raster(x0: u32, y0: u32, x1: u32, y1: u32) -> CanonicalRaster {
        let side = CanonicalRaster::SIDE;
        let mut img = GrayImage::new(side, side);
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        gray_to_raster(&img).unwrap()
    }

    #[test]
    fn blank_raster_scores_zero_everywhere() {
        let art = ArtEvaluator::new().evaluate(&CanonicalRaster::blank(), None);
        assert_eq!(art.pen_pressure, 0.0);
        assert_eq!(art.stroke_tips, 0.0);
        assert_eq!(art.stroke_fluency, 0.0);
        assert_eq!(art.ink_gradient, 0.0);
        assert_eq!(art.art_score, 0.0);
    }

    #[test]
    fn all_scores_stay_in_unit_range() {
        let raster = rect_raster(20, 50, 108, 70);
        let gray = GrayImage::from_pixel(
            CanonicalRaster::SIDE,
            CanonicalRaster::SIDE,
            Luma([180u8]),
        );
        let art = ArtEvaluator::new().evaluate(&raster, Some(&gray));

        for score in [
            art.pen_pressure,
            art.stroke_tips,
            art.stroke_fluency,
            art.ink_gradient,
            art.art_score,
        ] {
            assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
        }
    }

    #[test]
    fn missing_grayscale_zeroes_ink_gradient() {
        let raster = rect_raster(30, 60, 100, 68);
        let art = ArtEvaluator::new().evaluate(&raster, None);
        assert_eq!(art.ink_gradient, 0.0);
    }

    #[test]
    fn stroke_tips_positive_for_a_bar() {
        // A bar's skeleton is a line with two endpoints; the binary edge
        // at each endpoint produces a strong Sobel response.
        let raster = rect_raster(20, 60, 108, 66);
        let image = raster_to_gray(&raster);
        let score = ArtEvaluator::new().stroke_tips(&image);
        assert!(score > 0.0);
    }

    #[test]
    fn fluency_skips_short_contours() {
        // A 2×2 blob has a 4-point contour — below the 10-point minimum.
        let raster = rect_raster(60, 60, 62, 62);
        let image = raster_to_gray(&raster);
        assert_eq!(ArtEvaluator::new().stroke_fluency(&image), 0.0);
    }

    #[test]
    fn fluency_positive_for_long_smooth_stroke() {
        let raster = rect_raster(20, 58, 108, 70);
        let image = raster_to_gray(&raster);
        let score = ArtEvaluator::new().stroke_fluency(&image);
        assert!(score > 0.0);
        assert!(score <= 1.0);
    }

    #[test]
    fn ink_gradient_handles_mismatched_mask_size() {
        let raster = rect_raster(20, 50, 108, 78);
        // Grayscale source at a different resolution than the canonical mask.
        let mut gray = GrayImage::from_pixel(256, 256, Luma([230u8]));
        for y in 100..156 {
            for x in 40..216 {
                let shade = 40 + ((x - 40) / 4) as u8;
                gray.put_pixel(x, y, Luma([shade]));
            }
        }
        let art = ArtEvaluator::new().evaluate(&raster, Some(&gray));
        assert!((0.0..=1.0).contains(&art.ink_gradient));
    }

    #[test]
    fn feedback_lists_weak_areas() {
        let text = feedback_summary(0.2, 0.9, 0.9, 0.9);
        assert!(text.contains("pen pressure"));
        assert!(!text.contains("stroke tips"));
    }

    #[test]
    fn feedback_positive_when_all_strong() {
        let text = feedback_summary(0.9, 0.9, 0.9, 0.9);
        assert_eq!(text, "good artistic execution overall");
    }

    #[test]
    fn feedback_joins_multiple_remarks() {
        let text = feedback_summary(0.1, 0.1, 0.9, 0.9);
        assert!(text.contains("; "));
    }

    #[test]
    fn gradient_coherence_tiny_image_is_zero() {
        assert_eq!(gradient_coherence(&[1.0; 4], 2, 2), 0.0);
    }
}
