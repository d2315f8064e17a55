mod registry;
mod time;

pub use registry::{AlarmRegistry, DEFAULT_SCAN_MS};
pub use time::AlarmTime;

use serde::{Deserialize, Serialize};

pub type AlarmId = u64;

/// Label used when an alarm is created or edited with a blank one.
pub const DEFAULT_LABEL: &str = "Unnamed Alarm";

/// One scheduled alarm, as stored under `alarms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: AlarmId,
    pub time: AlarmTime,
    pub label: String,
    /// Fired for the current occurrence of `time`; cleared once the minute
    /// has passed.
    #[serde(default)]
    pub triggered: bool,
}

impl Alarm {
    pub(crate) fn new(id: AlarmId, time: AlarmTime, label: &str) -> Self {
        let label = label.trim();
        Self {
            id,
            time,
            label: if label.is_empty() {
                DEFAULT_LABEL.to_string()
            } else {
                label.to_string()
            },
            triggered: false,
        }
    }
}
