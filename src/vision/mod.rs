//! Vision layer
//!
//! Rasterizes drawings and runs them through a text-recognition backend:
//! - Windows OCR API (Windows only)
//! - A remote service reached over HTTP

pub mod http;
pub mod raster;
pub mod recognizer;
pub mod result;
pub mod service;
#[cfg(target_os = "windows")]
pub mod windows_ocr;

pub use http::HttpRecognitionService;
pub use raster::{InkRasterizer, RasterError, RasterImage, Rasterizer};
pub use recognizer::{summarize, Recognizer, RecognizerSettings, DEFAULT_PADDING, DEFAULT_SCALE};
pub use result::RecognitionResult;
pub use service::{
    RecognitionMode, RecognitionRequest, RecognitionService, ServiceError, TextCandidate,
    TextObservation, HANDWRITING_REVISION,
};
#[cfg(target_os = "windows")]
pub use windows_ocr::WindowsOcrService;

/// Recognition backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionBackend {
    /// Windows built-in OCR
    #[default]
    Windows,
    /// Remote JSON endpoint
    Http,
}

impl RecognitionBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Http => "http",
        }
    }
}
