//! Inkscribe - handwriting to text
//!
//! Freehand strokes are debounced, recolored, rasterized and handed to a
//! text-recognition backend; the recognized text is shown next to the canvas.

pub mod config;
pub mod dashboard;
pub mod ink;
pub mod pipeline;
pub mod vision;

#[cfg(test)]
pub(crate) mod testing;
