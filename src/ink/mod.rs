//! Ink Layer
//!
//! Stroke model, color classification and the recolor transform applied to
//! drawings before rasterization. Everything here is pure and independent of
//! any GUI toolkit.

pub mod color;
pub mod drawing;
pub mod geometry;
pub mod recolor;

pub use color::{
    is_essentially_black, is_visually_equal, Color, Srgba, DEFAULT_BLACK_TOLERANCE,
    DEFAULT_EQUALITY_TOLERANCE,
};
pub use drawing::{Drawing, Ink, InkKind, Stroke, StrokePoint};
pub use geometry::{AffineTransform, Point, Rect};
pub use recolor::{recolor, RecolorReport, RecolorSettings, SettingsError};
