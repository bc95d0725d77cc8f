//! Scripted collaborators for pipeline tests

use async_trait::async_trait;
use image::RgbaImage;
use parking_lot::Mutex;
use std::time::Duration;

use crate::ink::{Color, Drawing, Ink, InkKind, Rect, Stroke, StrokePoint};
use crate::vision::{
    RasterError, RasterImage, Rasterizer, RecognitionRequest, RecognitionService, ServiceError,
    TextObservation,
};

/// Drawing with `strokes` short black strokes laid out left to right
pub fn ink_drawing(strokes: usize) -> Drawing {
    (0..strokes)
        .map(|i| {
            let x = i as f32 * 20.0;
            Stroke::new(
                Ink::new(InkKind::Pen, Color::BLACK),
                vec![StrokePoint::new(x, 0.0, 3.0), StrokePoint::new(x + 10.0, 15.0, 3.0)],
            )
        })
        .collect()
}

/// Rasterizer that records its inputs and returns a 1x1 image
#[derive(Default)]
pub struct RecordingRasterizer {
    calls: Mutex<Vec<(Drawing, Rect, f32)>>,
    fail: bool,
}

impl RecordingRasterizer {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_call(&self) -> Option<(Drawing, Rect, f32)> {
        self.calls.lock().last().cloned()
    }
}

impl Rasterizer for RecordingRasterizer {
    fn rasterize(&self, drawing: &Drawing, region: Rect, scale: f32) -> Result<RasterImage, RasterError> {
        self.calls.lock().push((drawing.clone(), region, scale));
        if self.fail {
            return Err(RasterError::InvalidScale(scale));
        }
        Ok(RasterImage::new(RgbaImage::new(1, 1)))
    }
}

/// Service that replays a fixed response
pub struct ScriptedService {
    response: Result<Vec<TextObservation>, String>,
    requests: Mutex<Vec<RecognitionRequest>>,
    revision_support: bool,
    delay: Option<Duration>,
}

impl ScriptedService {
    pub fn returning(observations: Vec<TextObservation>) -> Self {
        Self {
            response: Ok(observations),
            requests: Mutex::new(Vec::new()),
            revision_support: false,
            delay: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            ..Self::returning(Vec::new())
        }
    }

    pub fn with_revision_support(mut self) -> Self {
        self.revision_support = true;
        self
    }

    /// Hold each call open for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<RecognitionRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl RecognitionService for ScriptedService {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn supports_revision(&self) -> bool {
        self.revision_support
    }

    async fn recognize(
        &self,
        _image: &RasterImage,
        request: &RecognitionRequest,
    ) -> Result<Vec<TextObservation>, ServiceError> {
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone().map_err(ServiceError::backend)
    }
}
