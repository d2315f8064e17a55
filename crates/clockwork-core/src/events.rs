use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmId, AlarmTime};

/// Every state change in the system produces an Event.
/// The presentation layer renders them; the notifier listens for the fire
/// events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownStopped {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownReset {
        target_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownDurationSet {
        target_secs: u64,
        at: DateTime<Utc>,
    },
    /// Fire event: the countdown reached zero. Emitted once per run.
    CountdownCompleted {
        target_secs: u64,
        label: Option<String>,
        at: DateTime<Utc>,
    },
    StopwatchStarted {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchStopped {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchReset {
        at: DateTime<Utc>,
    },
    /// Running stopwatch restored from the store.
    StopwatchResumed {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    LapRecorded {
        lap_number: usize,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    AlarmAdded {
        id: AlarmId,
        time: AlarmTime,
        label: String,
        at: DateTime<Utc>,
    },
    AlarmEdited {
        id: AlarmId,
        time: AlarmTime,
        label: String,
        at: DateTime<Utc>,
    },
    AlarmDeleted {
        id: AlarmId,
        at: DateTime<Utc>,
    },
    AlarmsCleared {
        count: usize,
        at: DateTime<Utc>,
    },
    /// Fire event: an alarm's minute arrived. Emitted once per occurrence.
    AlarmFired {
        id: AlarmId,
        time: AlarmTime,
        label: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Fire events are the ones that must produce sound.
    pub fn is_fire(&self) -> bool {
        matches!(
            self,
            Event::CountdownCompleted { .. } | Event::AlarmFired { .. }
        )
    }
}
