//! Debounce scheduler
//!
//! Coalesces a burst of change notifications into a single fire once the
//! input has been quiet for the window. Timers are never cancelled for real:
//! every change bumps a generation counter and a timer whose generation no
//! longer matches is simply ignored when it fires.

use std::time::Duration;
use tokio::time::Instant;

/// Quiet period after the last change before recognition runs
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Armed { deadline: Instant, generation: u64 },
}

/// Handed out by [`Debouncer::on_change`]; the caller schedules a fire for
/// `generation` at `deadline`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    generation: u64,
    state: DebounceState,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIESCENCE)
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: 0,
            state: DebounceState::Idle,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Most recently issued generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, DebounceState::Armed { .. })
    }

    /// Re-arm for a change observed at `now`, superseding any pending fire
    pub fn on_change(&mut self, now: Instant) -> Ticket {
        self.generation += 1;
        let deadline = now + self.window;
        self.state = DebounceState::Armed {
            deadline,
            generation: self.generation,
        };
        Ticket {
            generation: self.generation,
            deadline,
        }
    }

    /// Accept a timer callback. True at most once per armed generation.
    pub fn fire(&mut self, generation: u64) -> bool {
        match self.state {
            DebounceState::Armed {
                generation: armed, ..
            } if armed == generation => {
                self.state = DebounceState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Polled variant of [`Self::fire`]; returns the fired generation
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        match self.state {
            DebounceState::Armed {
                deadline,
                generation,
            } if now >= deadline => {
                self.state = DebounceState::Idle;
                Some(generation)
            }
            _ => None,
        }
    }

    /// Drop any pending fire. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.is_armed();
        self.state = DebounceState::Idle;
        was_armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_starts_idle() {
        let debouncer = Debouncer::default();
        assert_eq!(debouncer.state(), DebounceState::Idle);
        assert_eq!(debouncer.window(), DEFAULT_QUIESCENCE);
        assert_eq!(debouncer.generation(), 0);
    }

    #[test]
    fn test_burst_fires_once_after_last_change() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        let tickets: Vec<Ticket> = [0, 100, 200, 300]
            .into_iter()
            .map(|t| debouncer.on_change(start + ms(t)))
            .collect();

        assert_eq!(tickets[3].deadline, start + ms(800));
        assert_eq!(debouncer.poll(start + ms(799)), None);

        // Earlier timers arrive first and are all stale
        for ticket in &tickets[..3] {
            assert!(!debouncer.fire(ticket.generation));
        }
        assert!(debouncer.fire(tickets[3].generation));
        assert!(!debouncer.fire(tickets[3].generation));
        assert_eq!(debouncer.state(), DebounceState::Idle);
    }

    #[test]
    fn test_separate_quiet_segments_fire_separately() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        debouncer.on_change(start);
        assert_eq!(debouncer.poll(start + ms(500)), Some(1));

        debouncer.on_change(start + ms(600));
        assert_eq!(debouncer.poll(start + ms(1000)), None);
        assert_eq!(debouncer.poll(start + ms(1100)), Some(2));
        assert_eq!(debouncer.poll(start + ms(2000)), None);
    }

    #[test]
    fn test_cancel_prevents_fire() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(50));

        let ticket = debouncer.on_change(start);
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert!(!debouncer.fire(ticket.generation));
        assert_eq!(debouncer.poll(start + ms(100)), None);
    }

    #[test]
    fn test_generation_survives_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        let first = debouncer.on_change(start);
        debouncer.cancel();
        let second = debouncer.on_change(start + ms(10));

        assert!(second.generation > first.generation);
        assert!(!debouncer.fire(first.generation));
        assert!(debouncer.fire(second.generation));
    }
}
