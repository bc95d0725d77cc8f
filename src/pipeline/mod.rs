//! Recognition pipeline
//!
//! Debounces drawing changes and runs recognition in the background,
//! delivering results back to the interactive context.

pub mod controller;
pub mod debounce;
pub mod messages;

pub use controller::{DisplayTexts, InkController, Notifier};
pub use debounce::{DebounceState, Debouncer, Ticket, DEFAULT_QUIESCENCE};
pub use messages::PipelineEvent;
