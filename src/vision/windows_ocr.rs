//! Windows OCR API backend
//!
//! Uses the built-in Windows OCR (Media.Ocr). The engine has no notion of
//! recognition level, language correction or revisions, so only the
//! language list of the request is honored.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};
use windows::{
    core::HSTRING,
    Globalization::Language,
    Graphics::Imaging::{BitmapPixelFormat, SoftwareBitmap},
    Media::Ocr::OcrEngine as WinOcrEngine,
    Storage::Streams::DataWriter,
};

use super::raster::RasterImage;
use super::service::{RecognitionRequest, RecognitionService, ServiceError, TextObservation};

/// Windows OCR exposes no confidence; every line is reported as certain
const LINE_CONFIDENCE: f32 = 1.0;

/// Recognition service backed by the Windows OCR engine
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsOcrService;

impl WindowsOcrService {
    pub fn new() -> Self {
        Self
    }
}

/// Language tags installed for OCR on this system
fn installed_languages() -> Result<Vec<String>> {
    let languages = WinOcrEngine::AvailableRecognizerLanguages().context("Failed to list OCR languages")?;
    (0..languages.Size()?)
        .map(|i| Ok(languages.GetAt(i)?.LanguageTag()?.to_string()))
        .collect()
}

/// First supported language from `tags`, else the user profile languages
fn create_engine(tags: &[String]) -> Result<WinOcrEngine> {
    for tag in tags {
        let language = Language::CreateLanguage(&HSTRING::from(tag.as_str()))
            .with_context(|| format!("Failed to create language {tag}"))?;
        if WinOcrEngine::IsLanguageSupported(&language).context("Failed to check language support")? {
            debug!("Windows OCR using language {}", tag);
            return WinOcrEngine::TryCreateFromLanguage(&language)
                .context("Failed to create OCR engine for language");
        }
        debug!("OCR language '{}' not installed", tag);
    }

    match installed_languages() {
        Ok(installed) => warn!("None of {:?} installed for OCR (installed: {:?})", tags, installed),
        Err(e) => warn!("None of {:?} installed for OCR: {:#}", tags, e),
    }

    let engine = WinOcrEngine::TryCreateFromUserProfileLanguages()
        .context("Failed to create OCR engine from user profile")?;
    if let Ok(tag) = engine.RecognizerLanguage().and_then(|l| l.LanguageTag()) {
        info!("Windows OCR falling back to profile language {}", tag);
    }
    Ok(engine)
}

/// Convert RGBA to BGRA (Windows expects BGRA)
fn rgba_to_bgra(rgba: &[u8]) -> Vec<u8> {
    let mut bgra = rgba.to_vec();
    for chunk in bgra.chunks_exact_mut(4) {
        chunk.swap(0, 2);
    }
    bgra
}

fn create_software_bitmap(bgra: &[u8], width: u32, height: u32) -> Result<SoftwareBitmap> {
    let writer = DataWriter::new().context("Failed to create data writer")?;
    writer.WriteBytes(bgra).context("Failed to write pixel data")?;
    let buffer = writer.DetachBuffer().context("Failed to detach buffer")?;

    SoftwareBitmap::CreateCopyFromBuffer(&buffer, BitmapPixelFormat::Bgra8, width as i32, height as i32)
        .context("Failed to create SoftwareBitmap")
}

/// Blocking OCR pass; one observation per recognized line
fn recognize_lines(image: &RasterImage, languages: &[String]) -> Result<Vec<TextObservation>> {
    let engine = create_engine(languages)?;
    let bitmap = create_software_bitmap(&rgba_to_bgra(image.as_rgba()), image.width(), image.height())?;

    let result = engine
        .RecognizeAsync(&bitmap)
        .context("Failed to start OCR recognition")?
        .get()
        .context("OCR recognition failed")?;

    let lines = result.Lines().context("Failed to get OCR lines")?;
    let mut observations = Vec::new();
    for i in 0..lines.Size().context("Failed to get lines size")? {
        let line = lines.GetAt(i).context("Failed to get line")?;
        let text = line.Text().context("Failed to get line text")?.to_string();
        observations.push(TextObservation::single(text, LINE_CONFIDENCE));
    }
    Ok(observations)
}

#[async_trait]
impl RecognitionService for WindowsOcrService {
    fn name(&self) -> &'static str {
        "windows_ocr"
    }

    async fn recognize(
        &self,
        image: &RasterImage,
        request: &RecognitionRequest,
    ) -> Result<Vec<TextObservation>, ServiceError> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(Vec::new());
        }

        let image = image.clone();
        let languages = request.languages.clone();
        let observations = tokio::task::spawn_blocking(move || recognize_lines(&image, &languages))
            .await
            .map_err(|e| ServiceError::backend(format!("OCR worker failed: {e}")))?
            .map_err(|e| ServiceError::backend(format!("{e:#}")))?;

        debug!("Windows OCR: Found {} lines", observations.len());
        Ok(observations)
    }
}
