// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour curvature — external contours of a binary image and the discrete
// curvature along them: at each interior contour point, the angle between
// the two chords to its neighbours.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;

/// External (outermost) contours of a binary image, foreground > 0.
///
/// Equivalent to outer-border retrieval: inner hole borders and nested
/// outer borders are discarded.
pub fn external_contours(binary: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

/// Discrete curvature at each interior point of one contour.
///
/// For point i the chords run to points i-1 and i+1; the curvature sample is
/// the angle between them, via the arccos of their normalized dot product.
/// The cosine is clamped to [-1, 1] before the inverse cosine (rounding can
/// push it out of domain) and the denominator carries a 1e-5 epsilon so
/// coincident points cannot divide by zero. A straight run therefore
/// measures ~π, a right-angle corner ~π/2.
pub fn contour_curvature(points: &[Point<i32>]) -> Vec<f64> {
    let mut samples = Vec::new();
    if points.len() < 3 {
        return samples;
    }
    for i in 1..points.len() - 1 {
        let p1 = points[i - 1];
        let p2 = points[i];
        let p3 = points[i + 1];

        let v1 = ((p1.x - p2.x) as f64, (p1.y - p2.y) as f64);
        let v2 = ((p3.x - p2.x) as f64, (p3.y - p2.y) as f64);

        let dot = v1.0 * v2.0 + v1.1 * v2.1;
        let norms = (v1.0 * v1.0 + v1.1 * v1.1).sqrt() * (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
        let cos_angle = (dot / (norms + 1e-5)).clamp(-1.0, 1.0);
        samples.push(cos_angle.acos());
    }
    samples
}

/// All curvature samples across every external contour of the image.
pub fn curvature_samples(binary: &GrayImage) -> Vec<f64> {
    external_contours(binary)
        .iter()
        .flat_map(|contour| contour_curvature(contour))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn straight_chain_measures_pi() {
        let points: Vec<Point<i32>> = (0..10).map(|x| Point::new(x, 5)).collect();
        let samples = contour_curvature(&points);
        assert_eq!(samples.len(), 8);
        // The epsilon in the denominator keeps the cosine just above -1, so
        // allow a small tolerance around π.
        for angle in samples {
            assert!((angle - std::f64::consts::PI).abs() < 1e-2);
        }
    }

    #[test]
    fn right_angle_corner_measures_half_pi() {
        let points = vec![Point::new(0, 0), Point::new(1, 0), Point::new(1, 1)];
        let samples = contour_curvature(&points);
        assert_eq!(samples.len(), 1);
        assert!((samples[0] - std::f64::consts::FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn short_contours_yield_nothing() {
        assert!(contour_curvature(&[]).is_empty());
        assert!(contour_curvature(&[Point::new(0, 0), Point::new(1, 0)]).is_empty());
    }

    #[test]
    fn blank_image_has_no_contours() {
        let img = GrayImage::new(30, 30);
        assert!(external_contours(&img).is_empty());
        assert!(curvature_samples(&img).is_empty());
    }

    #[test]
    fn filled_square_has_one_external_contour() {
        let mut img = GrayImage::new(30, 30);
        for y in 8..22 {
            for x in 8..22 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        let contours = external_contours(&img);
        assert_eq!(contours.len(), 1);
        assert!(!curvature_samples(&img).is_empty());
    }
}
