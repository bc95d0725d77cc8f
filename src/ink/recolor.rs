//! Stroke recoloring
//!
//! Recognition engines tuned for printed text tend to do worse on pure
//! black handwriting than on a dark gray. Before rasterizing, every
//! near-black stroke is swapped for a substitute color.

use thiserror::Error;

use super::color::{is_essentially_black, is_visually_equal, Color, DEFAULT_EQUALITY_TOLERANCE};
use super::drawing::Drawing;

/// Invalid recolor configuration
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("blackness tolerance must be a finite, non-negative number (got {0})")]
    InvalidTolerance(f32),
    #[error("substitute color {0:?} cannot be normalized to sRGB")]
    UnnormalizableTarget(Color),
    #[error("substitute color {0:?} is itself essentially black at tolerance {1}")]
    TargetIsBlack(Color, f32),
}

/// Validated substitute color and blackness tolerance
///
/// The target color is guaranteed not to be essentially black under the
/// tolerance, so recoloring twice gives the same drawing as recoloring once.
#[derive(Debug, Clone, PartialEq)]
pub struct RecolorSettings {
    target: Color,
    tolerance: f32,
}

impl Default for RecolorSettings {
    /// Very dark gray substitute with a 0.1 blackness tolerance
    fn default() -> Self {
        Self {
            target: Color::gray(0.15, 1.0),
            tolerance: 0.1,
        }
    }
}

impl RecolorSettings {
    pub fn new(target: Color, tolerance: f32) -> Result<Self, SettingsError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(SettingsError::InvalidTolerance(tolerance));
        }
        if target.to_srgb().is_none() {
            return Err(SettingsError::UnnormalizableTarget(target));
        }
        if is_essentially_black(&target, tolerance) {
            return Err(SettingsError::TargetIsBlack(target, tolerance));
        }
        Ok(Self { target, tolerance })
    }

    pub fn target(&self) -> &Color {
        &self.target
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn apply(&self, drawing: &Drawing) -> Drawing {
        recolor(drawing, &self.target, self.tolerance)
    }
}

/// Replace the color of every essentially-black stroke with `target`
///
/// Stroke count, order, paths, transforms, masks and ink kinds are kept.
pub fn recolor(drawing: &Drawing, target: &Color, tolerance: f32) -> Drawing {
    drawing
        .strokes()
        .iter()
        .map(|stroke| {
            if is_essentially_black(stroke.color(), tolerance) {
                stroke.with_color(target.clone())
            } else {
                stroke.clone()
            }
        })
        .collect()
}

/// Stroke counts before and after a recolor pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecolorReport {
    /// Essentially-black strokes in the source drawing
    pub black_before: usize,
    /// Essentially-black strokes left after recoloring
    pub black_after: usize,
    /// Strokes visually equal to the substitute color after recoloring
    pub substituted: usize,
}

impl RecolorReport {
    pub fn compare(
        original: &Drawing,
        recolored: &Drawing,
        target: &Color,
        tolerance: f32,
    ) -> Self {
        let count_black = |d: &Drawing| {
            d.strokes()
                .iter()
                .filter(|s| is_essentially_black(s.color(), tolerance))
                .count()
        };
        Self {
            black_before: count_black(original),
            black_after: count_black(recolored),
            substituted: recolored
                .strokes()
                .iter()
                .filter(|s| is_visually_equal(s.color(), target, DEFAULT_EQUALITY_TOLERANCE))
                .count(),
        }
    }
}
