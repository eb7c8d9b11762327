mod clock;
mod driver;

use std::time::{Duration, Instant};

use log::debug;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{FetchDriver, FetchOutcome, FetchRequest};

pub const DEFAULT_STREAM_INTERVAL: Duration = Duration::from_millis(100);

pub const START_LABEL: &str = "Start Stream";
pub const STOP_LABEL: &str = "Stop Stream";

/// Whether a view is polling the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Stopped,
    Streaming,
}

/// Identifies one scheduled fetch so its response can be checked on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    seq: u64,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What to do with a response that just arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    /// Apply it.
    Live,
    /// Streaming was stopped (or restarted) after the fetch was issued.
    Stopped,
    /// A newer response was already applied.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    generation: u64,
    next_due: Instant,
}

/// The Stopped/Streaming state machine of one view.
///
/// It owns at most one repeating timer. Time only moves through the `now`
/// arguments, so a fake clock drives it deterministically.
#[derive(Debug)]
pub struct StreamController {
    interval: Duration,
    timer: Option<Timer>,
    generation: u64,
    next_seq: u64,
    last_applied: Option<u64>,
}

impl Default for StreamController {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_INTERVAL)
    }
}

impl StreamController {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timer: None,
            generation: 0,
            next_seq: 0,
            last_applied: None,
        }
    }

    pub fn state(&self) -> StreamState {
        match self.timer {
            Some(_) => StreamState::Streaming,
            None => StreamState::Stopped,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.timer.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of repeating timers currently scheduled, zero or one.
    pub fn active_timers(&self) -> usize {
        usize::from(self.timer.is_some())
    }

    /// The text for the stream control button.
    pub fn label(&self) -> &'static str {
        match self.state() {
            StreamState::Stopped => START_LABEL,
            StreamState::Streaming => STOP_LABEL,
        }
    }

    /// Schedules the repeating fetch. No-op while already streaming.
    ///
    /// The first tick is due one interval after `now`.
    ///
    /// # Returns
    /// Whether a new timer was scheduled.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.timer.is_some() {
            return false;
        }

        self.generation += 1;
        self.timer = Some(Timer {
            generation: self.generation,
            next_due: now + self.interval,
        });
        debug!("stream started (generation {})", self.generation);
        true
    }

    /// Cancels the repeating fetch. No-op while stopped.
    ///
    /// # Returns
    /// Whether a timer was cancelled.
    pub fn stop(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                debug!("stream stopped (generation {})", timer.generation);
                true
            }
            None => false,
        }
    }

    /// Flips between Stopped and Streaming.
    ///
    /// # Returns
    /// The new state.
    pub fn toggle(&mut self, now: Instant) -> StreamState {
        if !self.stop() {
            self.start(now);
        }
        self.state()
    }

    /// Returns a ticket when a fetch is due at `now`.
    ///
    /// Missed ticks are not replayed: after a long stall the next tick is one
    /// interval after `now`.
    pub fn poll(&mut self, now: Instant) -> Option<FetchTicket> {
        let timer = self.timer.as_mut()?;
        if now < timer.next_due {
            return None;
        }

        timer.next_due += self.interval;
        if timer.next_due <= now {
            timer.next_due = now + self.interval;
        }

        let ticket = FetchTicket {
            generation: timer.generation,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        Some(ticket)
    }

    /// Whether `ticket` belongs to the streaming session that is running now.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.timer
            .is_some_and(|timer| timer.generation == ticket.generation)
    }

    /// Decides whether the response for `ticket` may be applied and records it if so.
    pub fn admit(&mut self, ticket: FetchTicket) -> TicketStatus {
        if !self.is_current(ticket) {
            return TicketStatus::Stopped;
        }

        if self.last_applied.is_some_and(|last| last >= ticket.seq) {
            return TicketStatus::Stale;
        }

        self.last_applied = Some(ticket.seq);
        TicketStatus::Live
    }
}
