// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// inkgrade-vision — Image-to-feature pipeline for the Inkgrade scoring engine.
//
// Provides the preprocessor (decode, denoise, adaptive binarization,
// canonical resize), the feature extractor (stroke-shape and 3×3 structural
// grid descriptors), and the artistic evaluator (pen pressure, stroke tips,
// fluency, ink gradient).

pub mod art;
pub mod convert;
pub mod curvature;
pub mod features;
pub mod preprocess;
pub mod skeleton;

// Re-export the primary structs so callers can use `inkgrade_vision::Preprocessor` etc.
pub use art::ArtEvaluator;
pub use convert::{gray_to_raster, raster_to_gray};
pub use features::FeatureExtractor;
pub use preprocess::Preprocessor;

/// Mean and population standard deviation of a sample set, (0, 0) when empty.
///
/// The degenerate-input policy of the whole pipeline: an empty statistic is
/// zero, never an error.
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Euclidean distances from each ink pixel to the nearest background pixel,
/// positive values only — a half-stroke-width proxy at every point along
/// every stroke.
///
/// Computed by running the squared distance transform against the inverted
/// mask (background as sites) and sampling at ink pixels. Shared by the
/// stroke-width statistics and the pen-pressure sub-score.
pub(crate) fn half_stroke_widths(binary: &image::GrayImage) -> Vec<f64> {
    use imageproc::distance_transform::euclidean_squared_distance_transform;

    let (width, height) = binary.dimensions();
    let mut inverted = image::GrayImage::new(width, height);
    for (x, y, p) in binary.enumerate_pixels() {
        inverted.put_pixel(x, y, image::Luma([if p.0[0] > 0 { 0 } else { 255 }]));
    }

    let distances = euclidean_squared_distance_transform(&inverted);

    let mut widths = Vec::new();
    for (x, y, p) in binary.enumerate_pixels() {
        if p.0[0] > 0 {
            let d = distances.get_pixel(x, y).0[0].sqrt();
            if d > 0.0 {
                widths.push(d);
            }
        }
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::{half_stroke_widths, mean_std};
    use image::{GrayImage, Luma};

    #[test]
    fn mean_std_empty_is_zero() {
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }

    #[test]
    fn mean_std_known_values() {
        let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn half_stroke_widths_empty_for_blank_image() {
        assert!(half_stroke_widths(&GrayImage::new(32, 32)).is_empty());
    }

    #[test]
    fn half_stroke_widths_positive_inside_a_bar() {
        let mut img = GrayImage::new(32, 32);
        for y in 12..20 {
            for x in 4..28 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        let widths = half_stroke_widths(&img);
        assert!(!widths.is_empty());
        assert!(widths.iter().all(|&w| w > 0.0));
        // The bar is 8 pixels tall, so no pixel sits more than 4 away from
        // background.
        assert!(widths.iter().all(|&w| w <= 4.0));
    }
}
