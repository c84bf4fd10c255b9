// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessor — turns an arbitrary input raster into the canonical
// fixed-size binary form: decode (honouring EXIF orientation), grayscale,
// median denoise, locally-adaptive binarization (inverted so ink is
// foreground), and area-average resize to 128×128.

use image::metadata::Orientation;
use image::{DynamicImage, GrayImage, ImageDecoder, ImageReader, Luma};
use imageproc::filter::median_filter;
use inkgrade_core::error::{InkgradeError, Result};
use inkgrade_core::types::CanonicalRaster;
use tracing::{debug, instrument};

use crate::convert::gray_to_raster;

/// Preprocessing pipeline producing canonical rasters.
///
/// Every step is a pure transform with no hidden state; the struct only
/// carries the filter parameters.
pub struct Preprocessor {
    /// Median filter radius (1 = 3×3 window).
    median_radius: u32,
    /// Adaptive threshold neighbourhood radius (5 = 11×11 window).
    block_radius: u32,
    /// Constant subtracted from the local mean.
    threshold_offset: i32,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            median_radius: 1,
            block_radius: 5,
            threshold_offset: 2,
        }
    }

    pub fn with_config(config: &inkgrade_core::EngineConfig) -> Self {
        Self {
            median_radius: config.median_radius,
            block_radius: config.threshold_block_radius,
            threshold_offset: config.threshold_offset,
        }
    }

    // -- Decoding -------------------------------------------------------------

    /// Load a file as grayscale, applying any stored EXIF orientation.
    ///
    /// Returned separately from [`preprocess_path`](Self::preprocess_path) so
    /// callers can keep the original grayscale for ink-gradient analysis.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_grayscale(&self, path: impl AsRef<std::path::Path>) -> Result<GrayImage> {
        let reader = ImageReader::open(path.as_ref())
            .map_err(|err| {
                InkgradeError::Load(format!(
                    "failed to open {}: {}",
                    path.as_ref().display(),
                    err
                ))
            })?
            .with_guessed_format()
            .map_err(|err| InkgradeError::Load(err.to_string()))?;
        Self::decode_oriented(reader)
    }

    /// Decode raw encoded bytes (JPEG, PNG, ...) as grayscale, applying any
    /// stored EXIF orientation.
    #[instrument(skip_all, fields(data_len = data.len()))]
    pub fn decode_grayscale(&self, data: &[u8]) -> Result<GrayImage> {
        let reader = ImageReader::new(std::io::Cursor::new(data))
            .with_guessed_format()
            .map_err(|err| InkgradeError::Load(err.to_string()))?;
        Self::decode_oriented(reader)
    }

    fn decode_oriented<R: std::io::BufRead + std::io::Seek>(
        reader: ImageReader<R>,
    ) -> Result<GrayImage> {
        let mut decoder = reader
            .into_decoder()
            .map_err(|err| InkgradeError::Load(format!("failed to decode image: {}", err)))?;
        // Scans from phones commonly carry a rotation in EXIF rather than in
        // the pixel data.
        let orientation = decoder
            .orientation()
            .unwrap_or(Orientation::NoTransforms);
        let mut img = DynamicImage::from_decoder(decoder)
            .map_err(|err| InkgradeError::Load(format!("failed to decode image: {}", err)))?;
        img.apply_orientation(orientation);
        debug!(
            width = img.width(),
            height = img.height(),
            ?orientation,
            "image decoded"
        );
        Ok(img.to_luma8())
    }

    // -- Pipeline -------------------------------------------------------------

    /// Full pipeline from a file path.
    pub fn preprocess_path(&self, path: impl AsRef<std::path::Path>) -> Result<CanonicalRaster> {
        let gray = self.load_grayscale(path)?;
        self.preprocess_gray(&gray)
    }

    /// Full pipeline from raw encoded bytes.
    pub fn preprocess_bytes(&self, data: &[u8]) -> Result<CanonicalRaster> {
        let gray = self.decode_grayscale(data)?;
        self.preprocess_gray(&gray)
    }

    /// Pipeline from an already-decoded grayscale image: denoise, binarize,
    /// resize to canonical size.
    #[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
    pub fn preprocess_gray(&self, gray: &GrayImage) -> Result<CanonicalRaster> {
        let denoised = median_filter(gray, self.median_radius, self.median_radius);
        let binary = self.binarize(&denoised);
        let canonical = area_resize(&binary, CanonicalRaster::SIDE);
        debug!(ink_pixels = canonical.pixels().filter(|p| p.0[0] > 127).count(), "preprocessing complete");
        gray_to_raster(&canonical)
    }

    // -- Binarization ---------------------------------------------------------

    /// Adaptive mean threshold, inverted so ink becomes foreground (255).
    ///
    /// For each pixel the threshold is the mean intensity over the
    /// neighbourhood window minus `threshold_offset`; pixels at or below it
    /// (darker — ink on paper) become 255. A single global threshold cannot
    /// cope with the uneven illumination of scanned paper, hence the local
    /// mean via an integral image.
    fn binarize(&self, gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let integral = compute_integral_image(gray);
        let mut output = GrayImage::new(width, height);

        for y in 0..height {
            for x in 0..width {
                let local_mean = region_mean(&integral, width, height, x, y, self.block_radius);
                let threshold = local_mean - self.threshold_offset as f64;
                let pixel_val = gray.get_pixel(x, y).0[0] as f64;
                let binary = if pixel_val <= threshold { 255u8 } else { 0u8 };
                output.put_pixel(x, y, Luma([binary]));
            }
        }

        output
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// -- Integral image helpers ---------------------------------------------------

/// Compute the integral (summed-area table) of a grayscale image.
///
/// `integral[y * (width+1) + x]` contains the sum of all pixel values in the
/// rectangle [0, 0) to (x, y) (exclusive on both axes). The table has
/// dimensions `(width+1) x (height+1)` with a zero-padded border.
fn compute_integral_image(gray: &GrayImage) -> Vec<u64> {
    let (w, h) = gray.dimensions();
    let stride = (w + 1) as usize;
    let mut table = vec![0u64; stride * (h + 1) as usize];

    for y in 0..h {
        let mut row_sum: u64 = 0;
        for x in 0..w {
            row_sum += gray.get_pixel(x, y).0[0] as u64;
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[above];
        }
    }

    table
}

/// Mean pixel value within a square region centred on (cx, cy) with the
/// given radius, clamped to image bounds, via the integral image.
fn region_mean(
    integral: &[u64],
    img_width: u32,
    img_height: u32,
    cx: u32,
    cy: u32,
    radius: u32,
) -> f64 {
    let stride = (img_width + 1) as usize;

    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = ((cx + radius + 1) as usize).min(img_width as usize);
    let y2 = ((cy + radius + 1) as usize).min(img_height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    if area == 0.0 {
        return 128.0;
    }

    // Summed-area table lookup: S = I[y2][x2] - I[y1][x2] - I[y2][x1] + I[y1][x1]
    let sum = integral[y2 * stride + x2] as f64
        - integral[y1 * stride + x2] as f64
        - integral[y2 * stride + x1] as f64
        + integral[y1 * stride + x1] as f64;

    sum / area
}

// -- Canonical resize ---------------------------------------------------------

/// Resize to `side`×`side` by averaging each destination pixel's source
/// block (area interpolation — shrinks without aliasing, and is exactly
/// reproducible, which the content-addressed cache relies on).
fn area_resize(src: &GrayImage, side: u32) -> GrayImage {
    let (w, h) = src.dimensions();
    if w == side && h == side {
        return src.clone();
    }

    let mut out = GrayImage::new(side, side);
    for dy in 0..side {
        let y0 = (dy as u64 * h as u64 / side as u64) as u32;
        let y1 = (((dy + 1) as u64 * h as u64).div_ceil(side as u64) as u32).max(y0 + 1);
        for dx in 0..side {
            let x0 = (dx as u64 * w as u64 / side as u64) as u32;
            let x1 = (((dx + 1) as u64 * w as u64).div_ceil(side as u64) as u32).max(x0 + 1);

            let mut sum: u64 = 0;
            for sy in y0..y1.min(h) {
                for sx in x0..x1.min(w) {
                    sum += src.get_pixel(sx, sy).0[0] as u64;
                }
            }
            let count = ((y1.min(h) - y0) as u64 * (x1.min(w) - x0) as u64).max(1);
            out.put_pixel(dx, dy, Luma([(sum / count) as u8]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Grayscale test image: white paper with a dark horizontal bar.
    fn bar_image(width: u32, height: u32, bar_top: u32, bar_bottom: u32) -> GrayImage {
        let mut img = GrayImage::from_pixel(width, height, Luma([235u8]));
        for y in bar_top..bar_bottom {
            for x in 10..width - 10 {
                img.put_pixel(x, y, Luma([20u8]));
            }
        }
        img
    }

    #[test]
    fn preprocess_produces_canonical_binary() {
        let img = bar_image(256, 256, 120, 136);
        let raster = Preprocessor::new().preprocess_gray(&img).unwrap();

        assert!(raster.ink_count() > 0, "the bar must survive binarization");
        assert!(
            raster.pixels().iter().all(|&p| p == 0 || p == 255),
            "canonical raster must be strictly binary"
        );
    }

    #[test]
    fn preprocess_blank_page_has_no_ink() {
        let img = GrayImage::from_pixel(200, 200, Luma([240u8]));
        let raster = Preprocessor::new().preprocess_gray(&img).unwrap();
        assert_eq!(raster.ink_count(), 0);
    }

    #[test]
    fn binarize_inverts_ink_to_foreground() {
        let img = bar_image(64, 64, 30, 36);
        let binary = Preprocessor::new().binarize(&img);

        // A pixel inside the dark bar, near its edge, must be foreground.
        assert_eq!(binary.get_pixel(20, 30).0[0], 255);
        // A pixel far from the bar stays background.
        assert_eq!(binary.get_pixel(5, 5).0[0], 0);
    }

    #[test]
    fn area_resize_shrinks_to_side() {
        let img = GrayImage::from_pixel(300, 180, Luma([90u8]));
        let out = area_resize(&img, 128);
        assert_eq!(out.dimensions(), (128, 128));
        // Uniform input stays uniform under averaging.
        assert!(out.pixels().all(|p| p.0[0] == 90));
    }

    #[test]
    fn area_resize_noop_at_canonical_size() {
        let img = GrayImage::from_pixel(128, 128, Luma([7u8]));
        let out = area_resize(&img, 128);
        assert_eq!(out, img);
    }

    #[test]
    fn area_resize_averages_blocks() {
        // 256x256 → 128x128: each output pixel averages a 2x2 block.
        let mut img = GrayImage::new(256, 256);
        img.put_pixel(0, 0, Luma([255u8]));
        img.put_pixel(1, 0, Luma([255u8]));
        let out = area_resize(&img, 128);
        // (255 + 255 + 0 + 0) / 4 = 127
        assert_eq!(out.get_pixel(0, 0).0[0], 127);
        assert_eq!(out.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn decode_grayscale_rejects_garbage() {
        let result = Preprocessor::new().decode_grayscale(b"definitely not an image");
        assert!(matches!(result, Err(InkgradeError::Load(_))));
    }

    #[test]
    fn preprocess_bytes_round_trip_through_png() {
        let img = bar_image(200, 200, 90, 104);
        let mut encoded = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut encoded),
            image::ImageFormat::Png,
        )
        .unwrap();

        let pre = Preprocessor::new();
        let from_bytes = pre.preprocess_bytes(&encoded).unwrap();
        let from_gray = pre.preprocess_gray(&img).unwrap();
        assert_eq!(from_bytes, from_gray);
    }
}
