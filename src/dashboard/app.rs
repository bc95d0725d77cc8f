//! Dashboard application entry point

use eframe::egui;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::info;

use crate::dashboard::canvas::{InkCanvas, InkPalette};
use crate::dashboard::theme::{self, ThemeColors};
use crate::pipeline::{DisplayTexts, InkController};
use crate::vision::Recognizer;

/// Repaint cadence while a recognition is scheduled or running
const PENDING_REPAINT: Duration = Duration::from_millis(50);

pub struct InkscribeApp {
    controller: InkController,
    canvas: InkCanvas,
    palette: InkPalette,
}

impl InkscribeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, mut controller: InkController) -> Self {
        theme::apply_theme(&cc.egui_ctx);

        let ctx = cc.egui_ctx.clone();
        controller.set_notifier(move || ctx.request_repaint());

        Self {
            controller,
            canvas: InkCanvas::default(),
            palette: InkPalette::default(),
        }
    }

    pub fn options() -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([900.0, 700.0])
                .with_min_inner_size([480.0, 360.0])
                .with_title("Inkscribe"),
            ..Default::default()
        }
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .max_height(120.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                let color = theme::result_color(self.controller.current_result());
                ui.label(
                    egui::RichText::new(self.controller.display_text())
                        .size(20.0)
                        .color(color),
                );
            });

        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Clear Drawing").clicked() {
                self.canvas.cancel_stroke();
                self.controller.clear();
            }
            ui.separator();
            self.palette.show(ui);

            if self.controller.is_pending() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.spinner();
                });
            }
        });
    }
}

impl eframe::App for InkscribeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.process_pending();

        egui::TopBottomPanel::top("recognized_text")
            .frame(egui::Frame::none().fill(ThemeColors::BG_MEDIUM).inner_margin(12.0))
            .show(ctx, |ui| self.render_header(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            let drawing = self.controller.drawing().clone();
            if let Some(stroke) = self.canvas.show(ui, &drawing, &self.palette) {
                self.controller.on_strokes_changed(drawing.appending(stroke));
            }
        });

        if self.controller.is_pending() {
            ctx.request_repaint_after(PENDING_REPAINT);
        }
    }
}

/// Open the canvas window; blocks until it is closed
pub fn run_dashboard(
    recognizer: Arc<Recognizer>,
    runtime: Handle,
    window: Duration,
    texts: DisplayTexts,
) -> anyhow::Result<()> {
    info!("Opening canvas (debounce {:?})", window);
    let controller = InkController::new(recognizer, runtime, window, texts);

    eframe::run_native(
        "Inkscribe",
        InkscribeApp::options(),
        Box::new(|cc| Ok(Box::new(InkscribeApp::new(cc, controller)))),
    )
    .map_err(|e| anyhow::anyhow!("Window error: {}", e))
}
