//! Periodic callback bookkeeping for poll-driven engines.
//!
//! An engine holds `Option<Ticker>`: `Some` while its periodic work is armed,
//! `None` once cancelled. Cancelling is `take()`, so a poll that arrives after
//! stop or reset finds nothing to run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    period_ms: i64,
    next_due_ms: i64,
}

impl Ticker {
    /// Arm a ticker whose first callback is due one period after `now_ms`.
    pub fn arm(period_ms: u64, now_ms: i64) -> Self {
        let period_ms = i64::try_from(period_ms).unwrap_or(i64::MAX).max(1);
        Self {
            period_ms,
            next_due_ms: now_ms.saturating_add(period_ms),
        }
    }

    /// Arm a ticker whose first callback is due at `now_ms`.
    pub fn arm_immediate(period_ms: u64, now_ms: i64) -> Self {
        let mut ticker = Self::arm(period_ms, now_ms);
        ticker.next_due_ms = now_ms;
        ticker
    }

    pub fn period_ms(&self) -> i64 {
        self.period_ms
    }

    pub fn next_due_ms(&self) -> i64 {
        self.next_due_ms
    }

    /// Returns `true` if a callback is due at `now_ms` and schedules the next.
    ///
    /// Missed periods are not replayed: a poll that arrives several periods
    /// late yields one callback and the schedule restarts from `now_ms`.
    pub fn due(&mut self, now_ms: i64) -> bool {
        if now_ms < self.next_due_ms {
            return false;
        }
        let next = self.next_due_ms.saturating_add(self.period_ms);
        self.next_due_ms = if next <= now_ms {
            now_ms.saturating_add(self.period_ms)
        } else {
            next
        };
        true
    }
}
