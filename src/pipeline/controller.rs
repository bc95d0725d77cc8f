//! Ink controller
//!
//! Owns the drawing, the visible result and the debounce scheduler. Lives on
//! the interactive context (the UI update loop); background timers and
//! recognition tasks only ever talk back to it through the inbox drained by
//! [`InkController::process_pending`].

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::debounce::Debouncer;
use super::messages::PipelineEvent;
use crate::ink::Drawing;
use crate::vision::{RecognitionResult, Recognizer};

/// Callback used to wake the interactive context when an event is posted
pub type Notifier = Arc<dyn Fn() + Send + Sync>;

/// Texts shown when no recognition result is on screen
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayTexts {
    pub placeholder: String,
    pub cleared: String,
}

impl Default for DisplayTexts {
    fn default() -> Self {
        Self {
            placeholder: "Draw something and text will appear here.".to_string(),
            cleared: "Drawing cleared.".to_string(),
        }
    }
}

/// What the display binding currently shows
#[derive(Debug, Clone, PartialEq)]
enum DisplayState {
    Placeholder,
    Cleared,
    Result(RecognitionResult),
}

pub struct InkController {
    recognizer: Arc<Recognizer>,
    runtime: Handle,
    debouncer: Debouncer,
    drawing: Drawing,
    display: DisplayState,
    texts: DisplayTexts,
    events_tx: Sender<PipelineEvent>,
    events_rx: Receiver<PipelineEvent>,
    notifier: Option<Notifier>,
    /// Bumped by every clear; results started in an older epoch are dropped
    epoch: u64,
    /// Generation of the result currently on screen
    last_applied: u64,
    /// Recognitions started in the current epoch and not yet reported
    in_flight: usize,
    fire_count: u64,
    last_fired_at: Option<Instant>,
}

impl InkController {
    pub fn new(
        recognizer: Arc<Recognizer>,
        runtime: Handle,
        window: Duration,
        texts: DisplayTexts,
    ) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            recognizer,
            runtime,
            debouncer: Debouncer::new(window),
            drawing: Drawing::empty(),
            display: DisplayState::Placeholder,
            texts,
            events_tx,
            events_rx,
            notifier: None,
            epoch: 0,
            last_applied: 0,
            in_flight: 0,
            fire_count: 0,
            last_fired_at: None,
        }
    }

    /// Install a wake-up callback, invoked after every background post
    pub fn set_notifier(&mut self, notifier: impl Fn() + Send + Sync + 'static) {
        self.notifier = Some(Arc::new(notifier));
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    /// Result on screen, if the display is showing one
    pub fn current_result(&self) -> Option<&RecognitionResult> {
        match &self.display {
            DisplayState::Result(result) => Some(result),
            _ => None,
        }
    }

    pub fn display_text(&self) -> String {
        match &self.display {
            DisplayState::Placeholder => self.texts.placeholder.clone(),
            DisplayState::Cleared => self.texts.cleared.clone(),
            DisplayState::Result(result) => result.display_text(),
        }
    }

    /// A fire is scheduled or a recognition is still running
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_armed() || self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Number of accepted debounce fires
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    pub fn last_fired_at(&self) -> Option<Instant> {
        self.last_fired_at
    }

    /// Record new stroke content and (re)arm the debounce timer
    pub fn on_strokes_changed(&mut self, drawing: Drawing) {
        self.drawing = drawing;
        let ticket = self.debouncer.on_change(Instant::now());
        debug!(
            "Strokes changed ({} strokes); recognition armed as generation {}",
            self.drawing.len(),
            ticket.generation
        );

        let tx = self.events_tx.clone();
        let notifier = self.notifier.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep_until(ticket.deadline).await;
            let event = PipelineEvent::Fire {
                generation: ticket.generation,
                at: Instant::now(),
            };
            if tx.send(event).is_ok() {
                notify(&notifier);
            }
        });
    }

    /// Empty the drawing without recognizing it
    ///
    /// Cancels the pending fire and discards anything already in flight.
    pub fn clear(&mut self) {
        let cancelled = self.debouncer.cancel();
        let discarded = std::mem::take(&mut self.in_flight);
        self.epoch += 1;
        self.drawing = Drawing::empty();
        self.display = DisplayState::Cleared;
        info!(
            "Drawing cleared (pending fire cancelled: {}, results discarded: {})",
            cancelled, discarded
        );
    }

    /// Drain the inbox. Returns the number of events handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            handled += 1;
            match event {
                PipelineEvent::Fire { generation, at } => self.handle_fire(generation, at),
                PipelineEvent::Recognized {
                    generation,
                    epoch,
                    result,
                } => self.handle_recognized(generation, epoch, result),
            }
        }
        handled
    }

    fn handle_fire(&mut self, generation: u64, at: Instant) {
        if !self.debouncer.fire(generation) {
            debug!("Ignoring superseded timer for generation {}", generation);
            return;
        }
        self.fire_count += 1;
        self.last_fired_at = Some(at);
        self.start_recognition(generation);
    }

    fn start_recognition(&mut self, generation: u64) {
        let recognizer = self.recognizer.clone();
        let drawing = self.drawing.clone();
        let epoch = self.epoch;
        let tx = self.events_tx.clone();
        let notifier = self.notifier.clone();

        debug!(
            "Starting recognition for generation {} via {}",
            generation,
            recognizer.service_name()
        );
        self.in_flight += 1;

        self.runtime.spawn(async move {
            let worker = tokio::spawn(async move { recognizer.recognize(&drawing).await });
            let result = match worker.await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Recognition task for generation {} failed: {}", generation, e);
                    RecognitionResult::ServiceFailed(format!("recognition task failed: {e}"))
                }
            };
            let event = PipelineEvent::Recognized {
                generation,
                epoch,
                result,
            };
            if tx.send(event).is_ok() {
                notify(&notifier);
            }
        });
    }

    fn handle_recognized(&mut self, generation: u64, epoch: u64, result: RecognitionResult) {
        if epoch != self.epoch {
            debug!("Discarding result for generation {} from before clear", generation);
            return;
        }
        self.in_flight = self.in_flight.saturating_sub(1);

        if generation < self.last_applied {
            debug!(
                "Discarding stale result for generation {} (showing {})",
                generation, self.last_applied
            );
            return;
        }

        self.last_applied = generation;
        self.display = DisplayState::Result(result);
    }
}

fn notify(notifier: &Option<Notifier>) {
    if let Some(notify) = notifier {
        notify();
    }
}
