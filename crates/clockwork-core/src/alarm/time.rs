use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// A time of day at minute granularity, 24-hour clock.
///
/// Always displayed and stored as `HH:MM`. Parsing also accepts a
/// single-digit hour (`9:05`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlarmTime {
    hour: u8,
    minute: u8,
}

impl AlarmTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// The minute `at` falls in.
    pub fn of(at: &NaiveDateTime) -> Self {
        Self {
            hour: at.hour() as u8,
            minute: at.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    fn secs_from_midnight(&self) -> i64 {
        i64::from(self.hour) * 3600 + i64::from(self.minute) * 60
    }

    /// Seconds from `now` until this time of day next begins, in
    /// `(0, 86400]`. Inside the matching minute this is the next day's.
    pub fn secs_until_next(&self, now: &NaiveDateTime) -> i64 {
        let now_secs = i64::from(now.num_seconds_from_midnight());
        let delta = self.secs_from_midnight() - now_secs;
        if delta > 0 {
            delta
        } else {
            delta + SECS_PER_DAY
        }
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for AlarmTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::EmptyAlarmTime);
        }
        let invalid = || ValidationError::InvalidAlarmTime(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        let digits = |part: &str, min_len: usize| {
            (min_len..=2).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(h, 1) || !digits(m, 2) {
            return Err(invalid());
        }
        let hour = h.parse().map_err(|_| invalid())?;
        let minute = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for AlarmTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlarmTime> for String {
    fn from(value: AlarmTime) -> Self {
        value.to_string()
    }
}
