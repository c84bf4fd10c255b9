// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversions between the image-library-free `CanonicalRaster` carried by
// the core crate and the `GrayImage` buffers the vision algorithms run on.

use image::GrayImage;
use inkgrade_core::error::Result;
use inkgrade_core::types::CanonicalRaster;

/// View a canonical raster as a `GrayImage` (copies the pixel buffer).
pub fn raster_to_gray(raster: &CanonicalRaster) -> GrayImage {
    GrayImage::from_raw(
        CanonicalRaster::SIDE,
        CanonicalRaster::SIDE,
        raster.pixels().to_vec(),
    )
    .expect("canonical raster pixel count is a construction invariant")
}

/// Build a canonical raster from a 128×128 `GrayImage`, thresholding at 127.
///
/// Fails when the image is not exactly canonical-sized.
pub fn gray_to_raster(image: &GrayImage) -> Result<CanonicalRaster> {
    CanonicalRaster::new(image.as_raw().clone())
}
