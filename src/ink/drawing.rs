//! Stroke model
//!
//! A [`Drawing`] is an immutable, ordered list of [`Stroke`]s. Edits build a
//! new drawing; nothing here mutates in place.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::color::Color;
use super::geometry::{AffineTransform, Point, Rect};

/// Kind of pen that laid down the ink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InkKind {
    #[default]
    Pen,
    Pencil,
    Marker,
    Monoline,
}

impl InkKind {
    pub const ALL: [InkKind; 4] = [InkKind::Pen, InkKind::Pencil, InkKind::Marker, InkKind::Monoline];

    pub fn name(&self) -> &'static str {
        match self {
            InkKind::Pen => "Pen",
            InkKind::Pencil => "Pencil",
            InkKind::Marker => "Marker",
            InkKind::Monoline => "Monoline",
        }
    }
}

/// Ink: what a stroke is drawn with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ink {
    pub kind: InkKind,
    pub color: Color,
}

impl Ink {
    pub fn new(kind: InkKind, color: Color) -> Self {
        Self { kind, color }
    }
}

/// One sampled point along a stroke path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub location: Point,
    /// Rendered width of the stroke at this point
    pub width: f32,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32, width: f32) -> Self {
        Self {
            location: Point::new(x, y),
            width,
        }
    }
}

/// One continuous pen gesture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub ink: Ink,
    pub path: Arc<[StrokePoint]>,
    #[serde(default)]
    pub transform: AffineTransform,
    /// Clipping region in drawing coordinates
    #[serde(default)]
    pub mask: Option<Rect>,
}

impl Stroke {
    pub fn new(ink: Ink, path: impl Into<Arc<[StrokePoint]>>) -> Self {
        Self {
            ink,
            path: path.into(),
            transform: AffineTransform::IDENTITY,
            mask: None,
        }
    }

    pub fn with_transform(mut self, transform: AffineTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mask(mut self, mask: Rect) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Copy of this stroke with a different ink color
    ///
    /// The path is shared, not copied.
    pub fn with_color(&self, color: Color) -> Self {
        Self {
            ink: Ink::new(self.ink.kind, color),
            path: Arc::clone(&self.path),
            transform: self.transform,
            mask: self.mask,
        }
    }

    pub fn color(&self) -> &Color {
        &self.ink.color
    }

    /// Path points with the stroke transform applied
    pub fn transformed_points(&self) -> impl Iterator<Item = StrokePoint> + '_ {
        let scale = self.transform.width_scale();
        self.path.iter().map(move |p| StrokePoint {
            location: self.transform.apply(p.location),
            width: p.width * scale,
        })
    }

    /// Area covered by the stroke's ink, clipped to its mask
    pub fn bounds(&self) -> Rect {
        let mut points = self.transformed_points();
        let Some(first) = points.next() else {
            return Rect::EMPTY;
        };

        let (mut min, mut max) = (first.location, first.location);
        let mut max_width = first.width;
        for p in points {
            min.x = min.x.min(p.location.x);
            min.y = min.y.min(p.location.y);
            max.x = max.x.max(p.location.x);
            max.y = max.y.max(p.location.y);
            max_width = max_width.max(p.width);
        }

        let half = (max_width / 2.0).max(0.0);
        let bounds = Rect::from_points(
            Point::new(min.x - half, min.y - half),
            Point::new(max.x + half, max.y + half),
        );

        match self.mask {
            Some(mask) => bounds.intersection(&mask),
            None => bounds,
        }
    }
}

/// An ordered collection of strokes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Drawing {
    strokes: Vec<Stroke>,
}

impl Drawing {
    pub fn new(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// New drawing with `stroke` appended
    pub fn appending(&self, stroke: Stroke) -> Drawing {
        let mut strokes = self.strokes.clone();
        strokes.push(stroke);
        Drawing { strokes }
    }

    /// Union of all stroke bounds; empty means there is nothing to recognize
    pub fn bounds(&self) -> Rect {
        self.strokes
            .iter()
            .fold(Rect::EMPTY, |acc, stroke| acc.union(&stroke.bounds()))
    }
}

impl FromIterator<Stroke> for Drawing {
    fn from_iter<I: IntoIterator<Item = Stroke>>(iter: I) -> Self {
        Drawing {
            strokes: iter.into_iter().collect(),
        }
    }
}
