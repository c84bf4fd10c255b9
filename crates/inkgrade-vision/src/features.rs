// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Feature extractor — stroke-shape descriptors (distance-transform width
// statistics, skeleton-contour curvature statistics) and the 3×3
// structural-grid descriptor of a canonical raster.

use inkgrade_core::types::{
    CanonicalRaster, StrokeFeatureVector, StructuralCell, StructuralFeatureVector,
};
use tracing::{debug, instrument};

use crate::convert::raster_to_gray;
use crate::curvature::curvature_samples;
use crate::skeleton::zhang_suen_thin;
use crate::{half_stroke_widths, mean_std};

/// Extracts the stroke and structural feature vectors compared by the
/// evaluator. Stateless; extraction is deterministic, so the same raster
/// always yields bit-identical vectors.
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Both feature families in one pass over the raster.
    #[instrument(skip_all)]
    pub fn extract(
        &self,
        raster: &CanonicalRaster,
    ) -> (StrokeFeatureVector, StructuralFeatureVector) {
        let stroke = self.stroke_features(raster);
        let structure = self.structural_features(raster);
        debug!(
            width_mean = stroke.width_mean,
            curvature_mean = stroke.curvature_mean,
            "features extracted"
        );
        (stroke, structure)
    }

    /// Stroke-shape statistics.
    ///
    /// The distance transform value at each ink pixel is its distance to the
    /// nearest background pixel — a half-stroke-width proxy at every point
    /// along every stroke. Curvature is measured along the contours of the
    /// thinned skeleton. An all-background raster yields the zero vector
    /// (degenerate input, not an error).
    pub fn stroke_features(&self, raster: &CanonicalRaster) -> StrokeFeatureVector {
        let binary = raster_to_gray(raster);

        let widths = half_stroke_widths(&binary);
        let (width_mean, width_std) = mean_std(&widths);

        let skeleton = zhang_suen_thin(&binary);
        let curvature = curvature_samples(&skeleton);
        let (curvature_mean, curvature_std) = mean_std(&curvature);

        StrokeFeatureVector {
            width_mean,
            width_std,
            curvature_mean,
            curvature_std,
        }
    }

    /// 3×3 structural grid, row-major from the top-left cell.
    ///
    /// Cell bounds come from integer-dividing the side into thirds. Density
    /// is the ink fraction of the cell (epsilon-guarded denominator);
    /// `center_offset` is the distance of the ink centroid from the cell
    /// centre in the cell's own normalized [0,1]² space, zero for an empty
    /// cell.
    pub fn structural_features(&self, raster: &CanonicalRaster) -> StructuralFeatureVector {
        let side = CanonicalRaster::SIDE;
        let mut cells = [StructuralCell::default(); 9];

        for row in 0..3u32 {
            for col in 0..3u32 {
                let y0 = row * side / 3;
                let y1 = (row + 1) * side / 3;
                let x0 = col * side / 3;
                let x1 = (col + 1) * side / 3;
                let cell_w = (x1 - x0) as f64;
                let cell_h = (y1 - y0) as f64;

                let mut ink = 0u64;
                let mut sum_x = 0u64;
                let mut sum_y = 0u64;
                for y in y0..y1 {
                    for x in x0..x1 {
                        if raster.is_ink(x, y) {
                            ink += 1;
                            sum_x += (x - x0) as u64;
                            sum_y += (y - y0) as u64;
                        }
                    }
                }

                let density = ink as f64 / (cell_w * cell_h + 1e-5);
                let center_offset = if ink > 0 {
                    let cx = sum_x as f64 / ink as f64 / cell_w;
                    let cy = sum_y as f64 / ink as f64 / cell_h;
                    ((cx - 0.5) * (cx - 0.5) + (cy - 0.5) * (cy - 0.5)).sqrt()
                } else {
                    0.0
                };

                cells[(row * 3 + col) as usize] = StructuralCell {
                    density,
                    center_offset,
                };
            }
        }

        StructuralFeatureVector::new(cells)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::gray_to_raster;
    use image::{GrayImage, Luma};

    /// Canonical raster with an ink rectangle at [x0, x1) × [y0, y1).
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
    fn blank_raster_yields_zero_vectors() {
        let extractor = FeatureExtractor::new();
        let (stroke, structure) = extractor.extract(&CanonicalRaster::blank());

        assert_eq!(stroke, StrokeFeatureVector::default());
        for cell in structure.cells() {
            assert_eq!(cell.density, 0.0);
            assert_eq!(cell.center_offset, 0.0);
        }
    }

    #[test]
    fn structural_invariants_hold() {
        let raster = rect_raster(20, 30, 100, 90);
        let structure = FeatureExtractor::new().structural_features(&raster);

        assert_eq!(structure.cells().len(), 9);
        let max_offset = 0.5f64.sqrt();
        for cell in structure.cells() {
            assert!((0.0..=1.0).contains(&cell.density));
            assert!((0.0..=max_offset).contains(&cell.center_offset));
        }
    }

    #[test]
    fn full_frame_square_centres_on_middle_cell() {
        let side = CanonicalRaster::SIDE;
        let raster = rect_raster(0, 0, side, side);
        let structure = FeatureExtractor::new().structural_features(&raster);

        let center = structure.cell(4);
        assert!(center.density > 0.99);
        assert!(center.center_offset < 0.05);

        // Corner cells are smaller under integer-division thirds, so the
        // epsilon-guarded density sits strictly below the centre cell's.
        for corner in [0, 2, 6, 8] {
            assert!(structure.cell(corner).density < center.density);
        }
    }

    #[test]
    fn off_centre_ink_raises_offset() {
        // Ink confined to the top-left of the centre cell.
        let raster = rect_raster(44, 44, 54, 54);
        let structure = FeatureExtractor::new().structural_features(&raster);
        assert!(structure.cell(4).center_offset > 0.1);
        // The other cells stay empty.
        assert_eq!(structure.cell(0).density, 0.0);
    }

    #[test]
    fn wider_strokes_measure_wider() {
        let thin = FeatureExtractor::new().stroke_features(&rect_raster(10, 60, 118, 64));
        let thick = FeatureExtractor::new().stroke_features(&rect_raster(10, 50, 118, 74));

        assert!(thin.width_mean > 0.0);
        assert!(thick.width_mean > thin.width_mean);
    }

    #[test]
    fn extraction_is_deterministic() {
        let raster = rect_raster(30, 40, 90, 70);
        let extractor = FeatureExtractor::new();
        let first = extractor.extract(&raster);
        let second = extractor.extract(&raster);
        assert_eq!(first, second);
    }

    #[test]
    fn stroke_stats_are_non_negative() {
        let raster = rect_raster(25, 25, 95, 35);
        let stroke = FeatureExtractor::new().stroke_features(&raster);
        assert!(stroke.width_mean >= 0.0);
        assert!(stroke.width_std >= 0.0);
        assert!(stroke.curvature_mean >= 0.0);
        assert!(stroke.curvature_std >= 0.0);
    }
}
