//! Dashboard theme and styling
//!
//! Dark chrome around a paper-white canvas.

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

use crate::vision::RecognitionResult;

pub struct ThemeColors;

impl ThemeColors {
    pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 30);
    pub const BG_MEDIUM: Color32 = Color32::from_rgb(34, 34, 42);
    pub const BG_LIGHT: Color32 = Color32::from_rgb(46, 46, 56);

    pub const ACCENT: Color32 = Color32::from_rgb(88, 166, 255);
    pub const ERROR: Color32 = Color32::from_rgb(231, 76, 60);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(140, 140, 155);

    pub const BORDER: Color32 = Color32::from_rgb(50, 50, 65);

    /// Drawing surface
    pub const CANVAS: Color32 = Color32::WHITE;
}

/// Text color for the recognized-text panel
pub fn result_color(result: Option<&RecognitionResult>) -> Color32 {
    match result {
        Some(r) if r.is_error() => ThemeColors::ERROR,
        Some(r) if r.is_text() => ThemeColors::TEXT_PRIMARY,
        _ => ThemeColors::TEXT_MUTED,
    }
}

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    let mut visuals = Visuals::dark();

    visuals.window_fill = ThemeColors::BG_MEDIUM;
    visuals.panel_fill = ThemeColors::BG_DARK;
    visuals.faint_bg_color = ThemeColors::BG_LIGHT;
    visuals.extreme_bg_color = ThemeColors::BG_DARK;

    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.open,
    ] {
        widget.rounding = Rounding::same(6.0);
        widget.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_PRIMARY);
    }
    visuals.widgets.inactive.bg_fill = ThemeColors::BG_LIGHT;
    visuals.widgets.active.bg_fill = ThemeColors::ACCENT;
    visuals.widgets.active.rounding = Rounding::same(6.0);

    visuals.selection.stroke = Stroke::new(1.0, ThemeColors::ACCENT);
    visuals.window_stroke = Stroke::new(1.0, ThemeColors::BORDER);

    style.visuals = visuals;
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(12.0, 6.0);

    style.text_styles = [
        (TextStyle::Small, FontId::new(13.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(16.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(15.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(16.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(22.0, FontFamily::Proportional)),
    ]
    .into();

    ctx.set_style(style);
}
