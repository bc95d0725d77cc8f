//! Dashboard UI Module
//!
//! The canvas window: recognized text on top, ink palette and drawing
//! surface below.

pub mod app;
pub mod canvas;
pub mod theme;

pub use app::{run_dashboard, InkscribeApp};
pub use canvas::{InkCanvas, InkPalette, StrokeBuilder};
