// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Inkgrade scoring engine.

use serde::{Deserialize, Serialize};

use crate::error::{InkgradeError, Result};

/// Side length, in pixels, of every canonical raster.
pub const CANONICAL_SIDE: u32 = 128;

/// Canonical join key between a submission and its reference profile:
/// the 4-character uppercase zero-padded hex string of a Unicode code point
/// (e.g. `"6C38"` for 永).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterCode(String);

impl CharacterCode {
    /// Canonical code for a character.
    pub fn from_char(c: char) -> Self {
        Self(format!("{:04X}", c as u32))
    }

    /// Parse a user- or file-supplied code, normalizing case and zero-padding.
    ///
    /// Accepts 1–6 hex digits in either case; anything else is rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.len() > 6
            || !trimmed.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(InkgradeError::CharacterCode(s.to_owned()));
        }
        Ok(Self(format!("{:0>4}", trimmed.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode back to the character, if the code point is valid.
    pub fn to_char(&self) -> Option<char> {
        u32::from_str_radix(&self.0, 16).ok().and_then(char::from_u32)
    }
}

impl std::fmt::Display for CharacterCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Font style of a reference rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontStyle {
    Light,
    Medium,
    Regular,
}

impl FontStyle {
    /// Keyword used in the reference database and glyph directory names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Regular => "regular",
        }
    }

    pub const ALL: [FontStyle; 3] = [Self::Light, Self::Medium, Self::Regular];
}

impl std::str::FromStr for FontStyle {
    type Err = InkgradeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "regular" => Ok(Self::Regular),
            other => Err(InkgradeError::FontStyle(other.to_owned())),
        }
    }
}

impl std::fmt::Display for FontStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-size (128×128) single-channel binary image, ink = 255.
///
/// Produced once per input image by the preprocessor and immutable after
/// construction. Pixels are stored row-major as plain bytes so the type can
/// cross crate boundaries (and the cache) without dragging an image library
/// into the core. Construction forces every pixel to 0 or 255, so consumers
/// never need to re-binarize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRaster {
    pixels: Vec<u8>,
}

impl CanonicalRaster {
    pub const SIDE: u32 = CANONICAL_SIDE;

    /// Build from row-major pixel bytes. Values above 127 become ink (255),
    /// the rest background (0).
    pub fn new(mut pixels: Vec<u8>) -> Result<Self> {
        let expected = (Self::SIDE * Self::SIDE) as usize;
        if pixels.len() != expected {
            return Err(InkgradeError::RasterSize {
                expected,
                actual: pixels.len(),
            });
        }
        for p in &mut pixels {
            *p = if *p > 127 { 255 } else { 0 };
        }
        Ok(Self { pixels })
    }

    /// An all-background raster.
    pub fn blank() -> Self {
        Self {
            pixels: vec![0; (Self::SIDE * Self::SIDE) as usize],
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y * Self::SIDE + x) as usize]
    }

    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.get(x, y) > 0
    }

    /// Number of ink pixels.
    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p > 0).count()
    }
}

/// Stroke-shape descriptor: half-stroke-width statistics from the distance
/// transform plus discrete-curvature statistics from the skeleton contours.
/// All fields are non-negative; all zero for an image with no ink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeFeatureVector {
    pub width_mean: f64,
    pub width_std: f64,
    pub curvature_mean: f64,
    pub curvature_std: f64,
}

/// One cell of the 3×3 structural grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralCell {
    /// Fraction of the cell covered by ink, in [0, 1].
    pub density: f64,
    /// Distance of the ink centroid from the cell centre in the cell's own
    /// normalized [0,1]² space, in [0, √0.5]. Zero for an empty cell.
    pub center_offset: f64,
}

/// Spatial-layout descriptor: exactly 9 grid cells in row-major order
/// (top-left to bottom-right). The cell count is a construction invariant —
/// there is no way to build a partial vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructuralFeatureVector {
    cells: [StructuralCell; 9],
}

impl StructuralFeatureVector {
    pub fn new(cells: [StructuralCell; 9]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[StructuralCell; 9] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> &StructuralCell {
        &self.cells[index]
    }
}

impl Default for StructuralFeatureVector {
    fn default() -> Self {
        Self::new([StructuralCell::default(); 9])
    }
}

/// Artistic-execution sub-scores plus their weighted fusion, all in [0, 1],
/// and a feedback summary derived from fixed thresholds on the sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtisticFeatureVector {
    pub pen_pressure: f64,
    pub stroke_tips: f64,
    pub stroke_fluency: f64,
    pub ink_gradient: f64,
    pub art_score: f64,
    pub feedback: String,
}

/// Persisted feature profile of a machine-rendered reference character.
/// Built offline by the reference-set builder; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProfile {
    pub character_code: CharacterCode,
    pub font_style: FontStyle,
    /// The rendered character, when known.
    pub character: Option<char>,
    pub stroke: StrokeFeatureVector,
    pub structure: StructuralFeatureVector,
}

/// A (user value, reference value) pair surfaced for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetailPair {
    pub user: f64,
    pub reference: f64,
}

/// Per-field stroke comparison details.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeDetails {
    pub width_mean: DetailPair,
    pub width_std: DetailPair,
    pub curvature_mean: DetailPair,
}

/// Per-cell structural comparison details.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellDetails {
    pub density: DetailPair,
    pub center_offset: DetailPair,
}

/// User-vs-reference values for every compared field, row-major cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDetails {
    pub stroke: StrokeDetails,
    pub structure: [CellDetails; 9],
}

/// Outcome of comparing one submission against one reference profile.
///
/// `art` is populated only when the caller ran artistic evaluation (which it
/// should do only when both base scores clear the gate threshold); when it
/// is populated, `total_score` already includes the artistic blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub stroke_score: f64,
    pub structure_score: f64,
    pub total_score: f64,
    pub art: Option<ArtisticFeatureVector>,
    pub details: EvaluationDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_code_from_char() {
        assert_eq!(CharacterCode::from_char('永').as_str(), "6C38");
        assert_eq!(CharacterCode::from_char('A').as_str(), "0041");
    }

    #[test]
    fn character_code_parse_normalizes() {
        assert_eq!(CharacterCode::parse("6c38").unwrap().as_str(), "6C38");
        assert_eq!(CharacterCode::parse("41").unwrap().as_str(), "0041");
        assert_eq!(CharacterCode::parse(" 4e00 ").unwrap().as_str(), "4E00");
    }

    #[test]
    fn character_code_parse_rejects_garbage() {
        assert!(CharacterCode::parse("").is_err());
        assert!(CharacterCode::parse("xyz").is_err());
        assert!(CharacterCode::parse("12345678").is_err());
    }

    #[test]
    fn character_code_round_trip() {
        let code = CharacterCode::from_char('书');
        assert_eq!(code.to_char(), Some('书'));
    }

    #[test]
    fn font_style_round_trip() {
        for style in FontStyle::ALL {
            assert_eq!(style.as_str().parse::<FontStyle>().unwrap(), style);
        }
        assert!("bold".parse::<FontStyle>().is_err());
    }

    #[test]
    fn raster_rejects_wrong_size() {
        let result = CanonicalRaster::new(vec![0; 100]);
        assert!(matches!(
            result,
            Err(InkgradeError::RasterSize { expected: 16384, .. })
        ));
    }

    #[test]
    fn raster_binarizes_on_construction() {
        let mut pixels = vec![0u8; 16384];
        pixels[0] = 200;
        pixels[1] = 127;
        pixels[2] = 128;
        let raster = CanonicalRaster::new(pixels).unwrap();
        assert_eq!(raster.get(0, 0), 255);
        assert_eq!(raster.get(1, 0), 0);
        assert_eq!(raster.get(2, 0), 255);
        assert_eq!(raster.ink_count(), 2);
    }

    #[test]
    fn structural_vector_always_nine_cells() {
        let vector = StructuralFeatureVector::default();
        assert_eq!(vector.cells().len(), 9);
    }
}
