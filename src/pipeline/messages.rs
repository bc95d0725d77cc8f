//! Messages posted from background tasks to the controller inbox

use tokio::time::Instant;

use crate::vision::RecognitionResult;

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A debounce timer elapsed
    Fire { generation: u64, at: Instant },
    /// A recognition task finished
    Recognized {
        generation: u64,
        /// Clear epoch the task was started in
        epoch: u64,
        result: RecognitionResult,
    },
}
