//! Drawing rasterization
//!
//! Turns a vector [`Drawing`] into an RGBA bitmap for the recognition
//! service. Strokes are stamped as round-capped discs along their path.

use image::{ImageFormat, Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

use crate::ink::{Drawing, Point, Rect, Stroke, StrokePoint};

/// Rasterization failure
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("region {0:?} is empty")]
    EmptyRegion(Rect),
    #[error("scale {0} must be a positive, finite number")]
    InvalidScale(f32),
    #[error("raster of {width}x{height} exceeds the {max_pixels} pixel limit")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },
    #[error("failed to encode raster: {0}")]
    Encode(#[from] image::ImageError),
}

/// An RGBA raster produced from a drawing
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Raw RGBA bytes, row-major
    pub fn as_rgba(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Encode as PNG
    pub fn to_png(&self) -> Result<Vec<u8>, RasterError> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Converts a region of a drawing into a bitmap
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, drawing: &Drawing, region: Rect, scale: f32) -> Result<RasterImage, RasterError>;
}

/// Default rasterizer backed by `imageproc`
#[derive(Debug, Clone)]
pub struct InkRasterizer {
    background: Rgba<u8>,
    max_pixels: u64,
}

impl Default for InkRasterizer {
    fn default() -> Self {
        Self {
            background: Rgba([255, 255, 255, 255]),
            max_pixels: 40_000_000,
        }
    }
}

impl InkRasterizer {
    pub fn new(background: [u8; 4], max_pixels: u64) -> Self {
        Self {
            background: Rgba(background),
            max_pixels,
        }
    }
}

impl Rasterizer for InkRasterizer {
    fn rasterize(&self, drawing: &Drawing, region: Rect, scale: f32) -> Result<RasterImage, RasterError> {
        if region.is_empty() {
            return Err(RasterError::EmptyRegion(region));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RasterError::InvalidScale(scale));
        }

        let width = (region.width * scale).ceil().max(1.0) as u32;
        let height = (region.height * scale).ceil().max(1.0) as u32;
        if width as u64 * height as u64 > self.max_pixels {
            return Err(RasterError::TooLarge {
                width,
                height,
                max_pixels: self.max_pixels,
            });
        }

        let mut canvas = RgbaImage::from_pixel(width, height, self.background);
        let mapping = PixelMapping { region, scale };

        for stroke in drawing.strokes() {
            let Some(color) = stroke.color().to_srgb() else {
                debug!("Skipping stroke with unrenderable color {:?}", stroke.color());
                continue;
            };
            let ink = Rgba(color.to_rgba8());

            if stroke.mask.is_none() && ink[3] == 255 {
                stamp_stroke(&mut canvas, stroke, &mapping, ink);
            } else {
                let mut layer = RgbaImage::new(width, height);
                stamp_stroke(&mut layer, stroke, &mapping, ink);
                composite(&mut canvas, &layer, stroke.mask, &mapping);
            }
        }

        debug!(
            "Rasterized {} strokes into {}x{} (scale {})",
            drawing.len(),
            width,
            height,
            scale
        );
        Ok(RasterImage::new(canvas))
    }
}

/// Maps drawing coordinates to pixel coordinates and back
struct PixelMapping {
    region: Rect,
    scale: f32,
}

impl PixelMapping {
    fn to_pixel(&self, p: Point) -> (f32, f32) {
        ((p.x - self.region.x) * self.scale, (p.y - self.region.y) * self.scale)
    }

    fn to_drawing(&self, px: u32, py: u32) -> Point {
        Point::new(
            (px as f32 + 0.5) / self.scale + self.region.x,
            (py as f32 + 0.5) / self.scale + self.region.y,
        )
    }
}

fn stamp_stroke(canvas: &mut RgbaImage, stroke: &Stroke, mapping: &PixelMapping, ink: Rgba<u8>) {
    let points: Vec<StrokePoint> = stroke.transformed_points().collect();
    let radius_of = |p: &StrokePoint| (p.width * mapping.scale / 2.0).max(0.5);
    let (width, height) = (canvas.width() as f32, canvas.height() as f32);

    match points.as_slice() {
        [] => {}
        [only] => stamp(canvas, mapping.to_pixel(only.location), radius_of(only), ink),
        _ => {
            for pair in points.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                let (ra, rb) = (radius_of(a), radius_of(b));

                // Only the part of the segment whose discs can reach the canvas
                let reach = ra.max(rb);
                let (pa, pb) = (mapping.to_pixel(a.location), mapping.to_pixel(b.location));
                let Some((t0, t1)) = clip_segment(pa, pb, (-reach, -reach), (width + reach, height + reach))
                else {
                    continue;
                };
                let lerp = |t: f32| (pa.0 + (pb.0 - pa.0) * t, pa.1 + (pb.1 - pa.1) * t);
                let (ca, cb) = (lerp(t0), lerp(t1));
                let (rca, rcb) = (ra + (rb - ra) * t0, ra + (rb - ra) * t1);

                let steps = segment_steps(ca, cb, rca.min(rcb));
                for i in 0..=steps {
                    let t = i as f32 / steps as f32;
                    let center = (ca.0 + (cb.0 - ca.0) * t, ca.1 + (cb.1 - ca.1) * t);
                    stamp(canvas, center, rca + (rcb - rca) * t, ink);
                }
            }
        }
    }
}

/// Number of disc steps along a segment, spaced at half the smaller radius
fn segment_steps(a: (f32, f32), b: (f32, f32), min_radius: f32) -> u32 {
    let length = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
    let spacing = (min_radius / 2.0).max(0.5);
    (length / spacing).ceil().max(1.0) as u32
}

/// Liang-Barsky clip of segment `a -> b` against the box `min..max`
///
/// Returns the parameter range `[t0, t1]` inside the box, or `None` when the
/// segment misses it or has non-finite coordinates.
fn clip_segment(a: (f32, f32), b: (f32, f32), min: (f32, f32), max: (f32, f32)) -> Option<(f32, f32)> {
    if ![a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let (mut t0, mut t1) = (0.0f32, 1.0f32);

    for (p, q) in [
        (-dx, a.0 - min.0),
        (dx, max.0 - a.0),
        (-dy, a.1 - min.1),
        (dy, max.1 - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

fn stamp(canvas: &mut RgbaImage, center: (f32, f32), radius: f32, ink: Rgba<u8>) {
    draw_filled_circle_mut(
        canvas,
        (center.0.round() as i32, center.1.round() as i32),
        radius.round() as i32,
        ink,
    );
}

/// Blend a stroke layer onto the canvas, honoring the stroke mask
fn composite(canvas: &mut RgbaImage, layer: &RgbaImage, mask: Option<Rect>, mapping: &PixelMapping) {
    for (x, y, pixel) in layer.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        if let Some(mask) = mask {
            if !mask.contains(mapping.to_drawing(x, y)) {
                continue;
            }
        }
        canvas.get_pixel_mut(x, y).blend(pixel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ink::{Color, Ink, InkKind};

    fn horizontal(color: Color, y: f32) -> Stroke {
        Stroke::new(
            Ink::new(InkKind::Pen, color),
            vec![StrokePoint::new(0.0, y, 4.0), StrokePoint::new(40.0, y, 4.0)],
        )
    }

    #[test]
    fn test_rejects_empty_region() {
        let result = InkRasterizer::default().rasterize(&Drawing::empty(), Rect::EMPTY, 1.0);
        assert!(matches!(result, Err(RasterError::EmptyRegion(_))));
    }

    #[test]
    fn test_rejects_bad_scale() {
        let region = Rect::new(0.0, 0.0, 10.0, 10.0);
        let result = InkRasterizer::default().rasterize(&Drawing::empty(), region, 0.0);
        assert!(matches!(result, Err(RasterError::InvalidScale(_))));
    }

    #[test]
    fn test_rejects_oversized_raster() {
        let rasterizer = InkRasterizer::new([255, 255, 255, 255], 100);
        let region = Rect::new(0.0, 0.0, 20.0, 20.0);
        let result = rasterizer.rasterize(&Drawing::empty(), region, 1.0);
        assert!(matches!(result, Err(RasterError::TooLarge { .. })));
    }

    #[test]
    fn test_dimensions_follow_scale() {
        let region = Rect::new(-20.0, -20.0, 50.0, 30.0);
        let image = InkRasterizer::default()
            .rasterize(&Drawing::empty(), region, 2.0)
            .unwrap();
        assert_eq!((image.width(), image.height()), (100, 60));
        assert_eq!(image.as_rgba().len(), 100 * 60 * 4);
    }

    #[test]
    fn test_stroke_pixels_are_inked() {
        let drawing = Drawing::new(vec![horizontal(Color::gray(0.15, 1.0), 10.0)]);
        let region = Rect::new(0.0, 0.0, 40.0, 20.0);
        let image = InkRasterizer::default().rasterize(&drawing, region, 1.0).unwrap();

        let on_line = image.pixels().get_pixel(20, 10);
        assert_eq!(on_line.0, [38, 38, 38, 255]);

        let background = image.pixels().get_pixel(20, 2);
        assert_eq!(background.0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_mask_clips_ink() {
        let stroke = horizontal(Color::BLACK, 10.0).with_mask(Rect::new(0.0, 0.0, 20.0, 20.0));
        let drawing = Drawing::new(vec![stroke]);
        let region = Rect::new(0.0, 0.0, 40.0, 20.0);
        let image = InkRasterizer::default().rasterize(&drawing, region, 1.0).unwrap();

        assert_eq!(image.pixels().get_pixel(10, 10).0, [0, 0, 0, 255]);
        assert_eq!(image.pixels().get_pixel(30, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_pattern_strokes_are_skipped() {
        let stroke = horizontal(Color::Pattern { name: "dots".into() }, 10.0);
        let drawing = Drawing::new(vec![stroke]);
        let region = Rect::new(0.0, 0.0, 40.0, 20.0);
        let image = InkRasterizer::default().rasterize(&drawing, region, 1.0).unwrap();
        assert!(image.pixels().pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_clip_segment_to_box() {
        let clipped = clip_segment((-10.0, 5.0), (30.0, 5.0), (0.0, 0.0), (20.0, 10.0)).unwrap();
        assert!((clipped.0 - 0.25).abs() < 1e-6);
        assert!((clipped.1 - 0.75).abs() < 1e-6);

        assert!(clip_segment((-10.0, 50.0), (30.0, 50.0), (0.0, 0.0), (20.0, 10.0)).is_none());
        assert!(clip_segment((f32::NAN, 0.0), (1.0, 1.0), (0.0, 0.0), (20.0, 10.0)).is_none());
        assert_eq!(
            clip_segment((2.0, 2.0), (4.0, 4.0), (0.0, 0.0), (20.0, 10.0)),
            Some((0.0, 1.0))
        );
    }

    #[test]
    fn test_long_masked_stroke_is_bounded_by_raster() {
        let length = 1.0e9;
        let stroke = Stroke::new(
            Ink::new(InkKind::Pen, Color::BLACK),
            vec![StrokePoint::new(0.0, 5.0, 4.0), StrokePoint::new(length, 5.0, 4.0)],
        )
        .with_mask(Rect::new(0.0, 0.0, 10.0, 10.0));
        let drawing = Drawing::new(vec![stroke]);
        let region = drawing.bounds().inset_by(-20.0, -20.0);

        let image = InkRasterizer::default().rasterize(&drawing, region, 2.0).unwrap();

        assert_eq!((image.width(), image.height()), (100, 88));
        let inside = image.pixels().get_pixel(50, 44);
        assert_eq!(inside.0, [0, 0, 0, 255]);

        // The clipped part is what gets stamped, not the full stroke
        let (w, h) = (image.width() as f32, image.height() as f32);
        let (pa, pb) = ((40.0, 44.0), (length * 2.0 + 40.0, 44.0));
        let (t0, t1) = clip_segment(pa, pb, (-4.0, -4.0), (w + 4.0, h + 4.0)).unwrap();
        let lerp = |t: f32| (pa.0 + (pb.0 - pa.0) * t, pa.1);
        assert!(segment_steps(lerp(t0), lerp(t1), 4.0) < 200);
    }

    #[test]
    fn test_png_encoding() {
        let region = Rect::new(0.0, 0.0, 4.0, 4.0);
        let image = InkRasterizer::default()
            .rasterize(&Drawing::empty(), region, 1.0)
            .unwrap();
        let png = image.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
