//! Stopwatch engine.
//!
//! Elapsed time is always `now - anchor`, recomputed on every sample and
//! never accumulated by addition, so late or skipped samples cost nothing.
//! Every change is written to the store under `stopwatch`; a record saved
//! while running is resumed on load from its stored elapsed value.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::format::format_stopwatch;
use crate::clock::timestamp;
use crate::events::Event;
use crate::storage::{keys, Persistence};
use crate::ticker::Ticker;

pub const DEFAULT_SAMPLE_MS: u64 = 10;

/// Stored form of the stopwatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StopwatchRecord {
    /// Elapsed milliseconds.
    pub time: u64,
    pub is_active: bool,
    pub laps: Vec<u64>,
}

/// Render-ready stopwatch state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwatchSnapshot {
    pub elapsed_ms: u64,
    pub running: bool,
    pub laps: Vec<u64>,
    pub display: String,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    anchor_ms: i64,
    ticker: Ticker,
}

#[derive(Debug)]
pub struct Stopwatch {
    elapsed_ms: u64,
    laps: Vec<u64>,
    sample_ms: u64,
    run: Option<Run>,
    persistence: Arc<Persistence>,
}

impl Stopwatch {
    /// A zeroed, stopped stopwatch. Nothing is read from the store.
    pub fn new(persistence: Arc<Persistence>) -> Self {
        Self {
            elapsed_ms: 0,
            laps: Vec::new(),
            sample_ms: DEFAULT_SAMPLE_MS,
            run: None,
            persistence,
        }
    }

    pub fn with_sample_period(mut self, sample_ms: u64) -> Self {
        self.sample_ms = sample_ms.max(1);
        self
    }

    /// Restore from the store. A record saved while running resumes with a
    /// fresh anchor, so time spent unloaded is not counted.
    pub fn load(persistence: Arc<Persistence>, sample_ms: u64, now_ms: i64) -> (Self, Option<Event>) {
        let record: StopwatchRecord = persistence.load(keys::STOPWATCH).unwrap_or_default();
        let mut sw = Self::new(persistence).with_sample_period(sample_ms);
        sw.elapsed_ms = record.time;
        sw.laps = record.laps;

        if !record.is_active {
            return (sw, None);
        }
        sw.arm(now_ms);
        sw.persist();
        info!(elapsed_ms = sw.elapsed_ms, laps = sw.laps.len(), "stopwatch resumed");
        let event = Event::StopwatchResumed {
            elapsed_ms: sw.elapsed_ms,
            at: timestamp(now_ms),
        };
        (sw, Some(event))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    /// Duration of each lap: the gap since the previous lap, or since zero.
    pub fn lap_splits(&self) -> Vec<u64> {
        let mut prev = 0;
        self.laps
            .iter()
            .map(|&lap| {
                let split = lap.saturating_sub(prev);
                prev = lap;
                split
            })
            .collect()
    }

    pub fn record(&self) -> StopwatchRecord {
        StopwatchRecord {
            time: self.elapsed_ms,
            is_active: self.is_running(),
            laps: self.laps.clone(),
        }
    }

    pub fn snapshot(&self) -> StopwatchSnapshot {
        StopwatchSnapshot {
            elapsed_ms: self.elapsed_ms,
            running: self.is_running(),
            laps: self.laps.clone(),
            display: format_stopwatch(i64::try_from(self.elapsed_ms).unwrap_or(i64::MAX)),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now_ms: i64) -> Option<Event> {
        if self.is_running() {
            return None;
        }
        self.arm(now_ms);
        self.persist();
        debug!(elapsed_ms = self.elapsed_ms, "stopwatch started");
        Some(Event::StopwatchStarted {
            elapsed_ms: self.elapsed_ms,
            at: timestamp(now_ms),
        })
    }

    /// Take a final sample and freeze.
    pub fn stop(&mut self, now_ms: i64) -> Option<Event> {
        self.apply_sample(now_ms);
        self.run.take()?;
        self.persist();
        Some(Event::StopwatchStopped {
            elapsed_ms: self.elapsed_ms,
            at: timestamp(now_ms),
        })
    }

    pub fn reset(&mut self, now_ms: i64) -> Event {
        self.run = None;
        self.elapsed_ms = 0;
        self.laps.clear();
        self.persist();
        Event::StopwatchReset {
            at: timestamp(now_ms),
        }
    }

    /// Record the current elapsed time as a lap. No-op unless running.
    pub fn lap(&mut self, now_ms: i64) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        self.apply_sample(now_ms);
        self.laps.push(self.elapsed_ms);
        self.persist();
        Some(Event::LapRecorded {
            lap_number: self.laps.len(),
            elapsed_ms: self.elapsed_ms,
            at: timestamp(now_ms),
        })
    }

    /// Recompute elapsed from the anchor. Returns `true` if it changed.
    pub fn sample(&mut self, now_ms: i64) -> bool {
        let changed = self.apply_sample(now_ms);
        if changed {
            self.persist();
        }
        changed
    }

    /// Sample if the armed period has elapsed.
    pub fn poll(&mut self, now_ms: i64) -> bool {
        let due = self.run.as_mut().is_some_and(|r| r.ticker.due(now_ms));
        due && self.sample(now_ms)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self, now_ms: i64) {
        let elapsed = i64::try_from(self.elapsed_ms).unwrap_or(i64::MAX);
        self.run = Some(Run {
            anchor_ms: now_ms.saturating_sub(elapsed),
            ticker: Ticker::arm(self.sample_ms, now_ms),
        });
    }

    /// Elapsed never decreases, even if the wall clock steps backwards.
    fn apply_sample(&mut self, now_ms: i64) -> bool {
        let Some(run) = self.run else {
            return false;
        };
        let measured = u64::try_from(now_ms.saturating_sub(run.anchor_ms)).unwrap_or(0);
        if measured > self.elapsed_ms {
            self.elapsed_ms = measured;
            true
        } else {
            false
        }
    }

    fn persist(&self) {
        self.persistence.save(keys::STOPWATCH, &self.record());
    }
}
