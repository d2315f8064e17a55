//! Countdown engine.
//!
//! A fixed-period down-counter. Each due tick removes exactly one second;
//! the wall clock only decides *when* a tick is due, never how much it
//! subtracts. The countdown is not persisted.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped --start--> Running --tick to 0--> Stopped (CountdownCompleted)
//!    ^                  |
//!    +------stop--------+
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::format::format_countdown;
use crate::clock::timestamp;
use crate::error::ValidationError;
use crate::events::Event;
use crate::ticker::Ticker;

pub const DEFAULT_DURATION_SECS: u64 = 60;
pub const DEFAULT_TICK_MS: u64 = 1000;

/// Render-ready countdown state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub target_secs: u64,
    pub remaining_secs: u64,
    pub running: bool,
    pub label: Option<String>,
    pub display: String,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    target_secs: u64,
    remaining_secs: u64,
    tick_ms: u64,
    /// Armed while running; `None` means no tick can apply.
    ticker: Option<Ticker>,
    /// Set when this run's completion event has been emitted.
    completion_sent: bool,
    label: Option<String>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

impl Countdown {
    /// A stopped countdown of `duration_secs` (at least one second).
    pub fn new(duration_secs: u64) -> Self {
        let target = duration_secs.max(1);
        Self {
            target_secs: target,
            remaining_secs: target,
            tick_ms: DEFAULT_TICK_MS,
            ticker: None,
            completion_sent: false,
            label: None,
        }
    }

    pub fn with_tick_period(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn target_secs(&self) -> u64 {
        self.target_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// 0.0 .. 1.0 elapsed fraction of the target.
    pub fn progress(&self) -> f64 {
        1.0 - (self.remaining_secs as f64 / self.target_secs as f64)
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            target_secs: self.target_secs,
            remaining_secs: self.remaining_secs,
            running: self.is_running(),
            label: self.label.clone(),
            display: format_countdown(self.remaining_secs),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Overwrite target and remaining. Rejected while running.
    pub fn set_duration(&mut self, secs: u64, now_ms: i64) -> Result<Event, ValidationError> {
        if self.is_running() {
            return Err(ValidationError::CountdownRunning);
        }
        if secs == 0 {
            return Err(ValidationError::NonPositiveDuration);
        }
        self.target_secs = secs;
        self.remaining_secs = secs;
        Ok(Event::CountdownDurationSet {
            target_secs: secs,
            at: timestamp(now_ms),
        })
    }

    /// Pair a label with the countdown. Presentational only.
    pub fn select_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn start(&mut self, now_ms: i64) -> Option<Event> {
        if self.is_running() || self.remaining_secs == 0 {
            return None;
        }
        self.ticker = Some(Ticker::arm(self.tick_ms, now_ms));
        self.completion_sent = false;
        debug!(remaining_secs = self.remaining_secs, "countdown started");
        Some(Event::CountdownStarted {
            remaining_secs: self.remaining_secs,
            at: timestamp(now_ms),
        })
    }

    pub fn stop(&mut self, now_ms: i64) -> Option<Event> {
        self.ticker.take()?;
        Some(Event::CountdownStopped {
            remaining_secs: self.remaining_secs,
            at: timestamp(now_ms),
        })
    }

    pub fn reset(&mut self, now_ms: i64) -> Event {
        self.ticker = None;
        self.remaining_secs = self.target_secs;
        Event::CountdownReset {
            target_secs: self.target_secs,
            at: timestamp(now_ms),
        }
    }

    /// Apply one period. Returns `CountdownCompleted` on the tick that
    /// reaches zero; the engine is stopped afterwards.
    pub fn tick(&mut self, now_ms: i64) -> Option<Event> {
        if self.ticker.is_none() {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        self.ticker = None;
        if self.completion_sent {
            return None;
        }
        self.completion_sent = true;
        info!(target_secs = self.target_secs, label = ?self.label, "countdown complete");
        Some(Event::CountdownCompleted {
            target_secs: self.target_secs,
            label: self.label.clone(),
            at: timestamp(now_ms),
        })
    }

    /// Tick if the armed period has elapsed.
    pub fn poll(&mut self, now_ms: i64) -> Option<Event> {
        let due = self.ticker.as_mut().is_some_and(|t| t.due(now_ms));
        if due {
            self.tick(now_ms)
        } else {
            None
        }
    }
}
