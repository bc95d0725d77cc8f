//! Recognition outcomes shown to the user

/// Terminal outcome of one recognition attempt
///
/// Every variant is a user-visible status; none of them is fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionResult {
    /// Recognized lines, in region order
    Text(Vec<String>),
    /// The drawing had no ink to recognize
    EmptyCanvas,
    /// The service found no text regions
    NoTextFound,
    /// Regions were found but no candidate text survived
    NoConfidentText,
    /// The drawing could not be turned into an image
    RasterizationFailed,
    /// The service reported an error
    ServiceFailed(String),
}

impl RecognitionResult {
    /// Build from the top candidate of each region
    ///
    /// An empty joined text collapses to [`RecognitionResult::NoConfidentText`].
    pub fn from_lines(lines: Vec<String>) -> Self {
        if lines.join("\n").is_empty() {
            RecognitionResult::NoConfidentText
        } else {
            RecognitionResult::Text(lines)
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, RecognitionResult::Text(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            RecognitionResult::RasterizationFailed | RecognitionResult::ServiceFailed(_)
        )
    }

    /// Text for the display binding
    pub fn display_text(&self) -> String {
        match self {
            RecognitionResult::Text(lines) => lines.join("\n"),
            RecognitionResult::EmptyCanvas => "Canvas is empty.".to_string(),
            RecognitionResult::NoTextFound => "No text recognized.".to_string(),
            RecognitionResult::NoConfidentText => "No text confidently recognized.".to_string(),
            RecognitionResult::RasterizationFailed => "Error processing drawing.".to_string(),
            RecognitionResult::ServiceFailed(message) => format!("Error: {}", message),
        }
    }
}
