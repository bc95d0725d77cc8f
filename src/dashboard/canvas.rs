//! Drawing surface and ink palette

use egui::{Color32, Pos2, Rect as ScreenRect, Sense, Shape, Stroke as LineStroke, Vec2};

use crate::dashboard::theme::ThemeColors;
use crate::ink::{Color, Drawing, Ink, InkKind, Point, Stroke, StrokePoint};

/// Pointer samples closer than this to the previous one are dropped
const MIN_SAMPLE_SPACING: f32 = 1.5;

/// Ink currently selected in the palette
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkPalette {
    pub color: Color32,
    pub width: f32,
    pub kind: InkKind,
}

impl Default for InkPalette {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            width: 4.0,
            kind: InkKind::Pen,
        }
    }
}

impl InkPalette {
    pub fn ink(&self) -> Ink {
        Ink::new(self.kind, Color::from_rgba8(self.color.to_srgba_unmultiplied()))
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Ink");
            ui.color_edit_button_srgba(&mut self.color);
            ui.add(egui::Slider::new(&mut self.width, 1.0..=16.0).text("Width"));
            egui::ComboBox::from_id_salt("ink_kind")
                .selected_text(self.kind.name())
                .show_ui(ui, |ui| {
                    for kind in InkKind::ALL {
                        ui.selectable_value(&mut self.kind, kind, kind.name());
                    }
                });
        });
    }
}

/// Collects pointer samples for the stroke being drawn
#[derive(Debug, Default)]
pub struct StrokeBuilder {
    points: Vec<StrokePoint>,
}

impl StrokeBuilder {
    pub fn is_drawing(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn push(&mut self, at: Point, width: f32) {
        if let Some(last) = self.points.last() {
            if last.location.distance(at) < MIN_SAMPLE_SPACING {
                return;
            }
        }
        self.points.push(StrokePoint::new(at.x, at.y, width));
    }

    /// Finish the gesture; `None` if nothing was sampled
    pub fn finish(&mut self, ink: Ink) -> Option<Stroke> {
        if self.points.is_empty() {
            return None;
        }
        let points = std::mem::take(&mut self.points);
        Some(Stroke::new(ink, points))
    }

    pub fn cancel(&mut self) {
        self.points.clear();
    }
}

/// Screen color for a stroke; unrenderable colors fall back to gray
pub fn to_color32(color: &Color) -> Color32 {
    match color.to_srgb() {
        Some(srgba) => {
            let [r, g, b, a] = srgba.to_rgba8();
            Color32::from_rgba_unmultiplied(r, g, b, a)
        }
        None => Color32::GRAY,
    }
}

/// Interactive canvas. Returns a stroke when the user lifts the pointer.
#[derive(Default)]
pub struct InkCanvas {
    builder: StrokeBuilder,
}

impl InkCanvas {
    pub fn cancel_stroke(&mut self) {
        self.builder.cancel();
    }

    pub fn show(&mut self, ui: &mut egui::Ui, drawing: &Drawing, palette: &InkPalette) -> Option<Stroke> {
        let size = ui.available_size();
        let (response, painter) = ui.allocate_painter(size, Sense::drag());
        let area = response.rect;

        painter.rect_filled(area, 4.0, ThemeColors::CANVAS);

        let to_local = |pos: Pos2| {
            let v = pos - area.min;
            Point::new(v.x, v.y)
        };

        if response.drag_started() || response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.builder.push(to_local(pos), palette.width);
            }
        }

        let finished = if response.drag_stopped() {
            self.builder.finish(palette.ink())
        } else {
            None
        };

        for stroke in drawing.strokes() {
            let points: Vec<StrokePoint> = stroke.transformed_points().collect();
            paint_points(&painter, area, &points, to_color32(stroke.color()));
        }
        if let Some(stroke) = &finished {
            paint_points(&painter, area, &stroke.path, to_color32(stroke.color()));
        }
        paint_points(&painter, area, self.builder.points(), palette.color);

        finished
    }
}

fn paint_points(painter: &egui::Painter, area: ScreenRect, points: &[StrokePoint], color: Color32) {
    let to_screen = |p: &StrokePoint| area.min + Vec2::new(p.location.x, p.location.y);
    match points {
        [] => {}
        [only] => {
            painter.circle_filled(to_screen(only), only.width / 2.0, color);
        }
        _ => {
            for pair in points.windows(2) {
                let width = (pair[0].width + pair[1].width) / 2.0;
                painter.add(Shape::line_segment(
                    [to_screen(&pair[0]), to_screen(&pair[1])],
                    LineStroke::new(width, color),
                ));
                painter.circle_filled(to_screen(&pair[1]), width / 2.0, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_drops_close_samples() {
        let mut builder = StrokeBuilder::default();
        builder.push(Point::new(0.0, 0.0), 3.0);
        builder.push(Point::new(0.5, 0.5), 3.0);
        builder.push(Point::new(5.0, 0.0), 3.0);
        assert_eq!(builder.points().len(), 2);
    }

    #[test]
    fn test_finish_builds_stroke_with_palette_ink() {
        let palette = InkPalette {
            kind: InkKind::Marker,
            ..InkPalette::default()
        };
        let mut builder = StrokeBuilder::default();
        builder.push(Point::new(1.0, 2.0), palette.width);
        builder.push(Point::new(10.0, 2.0), palette.width);

        let stroke = builder.finish(palette.ink()).unwrap();
        assert_eq!(stroke.path.len(), 2);
        assert_eq!(stroke.ink.kind, InkKind::Marker);
        assert!(stroke.color().is_essentially_black(0.05));
        assert!(!builder.is_drawing());
        assert!(builder.finish(palette.ink()).is_none());
    }

    #[test]
    fn test_to_color32() {
        assert_eq!(to_color32(&Color::gray(1.0, 1.0)), Color32::WHITE);
        assert_eq!(to_color32(&Color::Pattern { name: "hatch".into() }), Color32::GRAY);
    }
}
