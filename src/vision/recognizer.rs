//! Recognition orchestrator
//!
//! Takes a drawing through recolor, rasterization and the recognition
//! service, and condenses whatever happens into a single
//! [`RecognitionResult`]. Failures never escape as errors.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::raster::{RasterImage, Rasterizer};
use super::result::RecognitionResult;
use super::service::{RecognitionRequest, RecognitionService, TextObservation};
use crate::ink::{Drawing, RecolorReport, RecolorSettings};

/// Margin added around the drawing bounds so edge strokes are not clipped
pub const DEFAULT_PADDING: f32 = 20.0;

/// Pixels per drawing unit
pub const DEFAULT_SCALE: f32 = 2.0;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerSettings {
    pub recolor: RecolorSettings,
    pub padding: f32,
    pub scale: f32,
    pub request: RecognitionRequest,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            recolor: RecolorSettings::default(),
            padding: DEFAULT_PADDING,
            scale: DEFAULT_SCALE,
            request: RecognitionRequest::default(),
        }
    }
}

/// Drives one drawing through the recognition pipeline
pub struct Recognizer {
    rasterizer: Arc<dyn Rasterizer>,
    service: Arc<dyn RecognitionService>,
    settings: RecognizerSettings,
}

impl Recognizer {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        service: Arc<dyn RecognitionService>,
        settings: RecognizerSettings,
    ) -> Self {
        Self {
            rasterizer,
            service,
            settings,
        }
    }

    pub fn settings(&self) -> &RecognizerSettings {
        &self.settings
    }

    pub fn service_name(&self) -> &'static str {
        self.service.name()
    }

    /// Request as sent to the service; the revision pin is dropped for
    /// services that cannot select one
    pub fn effective_request(&self) -> RecognitionRequest {
        let mut request = self.settings.request.clone();
        if !self.service.supports_revision() {
            request.revision = None;
        }
        request
    }

    /// Validate, recolor and rasterize
    ///
    /// Side-effect free; the `Err` side carries the terminal status.
    pub fn prepare(&self, drawing: &Drawing) -> Result<RasterImage, RecognitionResult> {
        let bounds = drawing.bounds();
        if bounds.is_empty() {
            debug!("Drawing has no ink; skipping recognition");
            return Err(RecognitionResult::EmptyCanvas);
        }

        let recolor = &self.settings.recolor;
        let recolored = recolor.apply(drawing);
        let report = RecolorReport::compare(drawing, &recolored, recolor.target(), recolor.tolerance());
        debug!(
            "Recolor: {} black strokes before, {} after, {} with the substitute color",
            report.black_before, report.black_after, report.substituted
        );

        let region = bounds.inset_by(-self.settings.padding, -self.settings.padding);
        self.rasterizer
            .rasterize(&recolored, region, self.settings.scale)
            .map_err(|e| {
                warn!("Failed to rasterize drawing: {}", e);
                RecognitionResult::RasterizationFailed
            })
    }

    /// Run the full pipeline for `drawing`
    pub async fn recognize(&self, drawing: &Drawing) -> RecognitionResult {
        let start = Instant::now();

        let image = match self.prepare(drawing) {
            Ok(image) => image,
            Err(status) => return status,
        };

        let request = self.effective_request();
        let result = match self.service.recognize(&image, &request).await {
            Ok(observations) => summarize(&observations),
            Err(e) => {
                warn!("Recognition via {} failed: {}", self.service.name(), e);
                RecognitionResult::ServiceFailed(e.to_string())
            }
        };

        info!(
            "Recognition ({}) on {}x{} raster finished in {:?}: {:?}",
            self.service.name(),
            image.width(),
            image.height(),
            start.elapsed(),
            result
        );
        result
    }
}

/// Reduce service output to a result: one line per region, top candidate only
pub fn summarize(observations: &[TextObservation]) -> RecognitionResult {
    if observations.is_empty() {
        return RecognitionResult::NoTextFound;
    }
    let lines = observations
        .iter()
        .filter_map(|o| o.top_candidate())
        .map(|c| c.text.clone())
        .collect();
    RecognitionResult::from_lines(lines)
}
