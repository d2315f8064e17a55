//! Wall-clock sources.
//!
//! Engines never read the OS clock directly. They take timestamps from a
//! [`Clock`] so tests and simulations can drive time by hand.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;

    /// Local wall time, used for time-of-day alarm matching.
    fn local_now(&self) -> NaiveDateTime;
}

/// Convert epoch milliseconds to a UTC timestamp for event payloads.
pub fn timestamp(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
///
/// `now_ms` is derived from the held local time as if it were UTC, which
/// keeps both readings consistent while advancing.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Clock starting at `HH:MM:00` on 2024-01-01.
    pub fn at_hm(hour: u32, minute: u32) -> Self {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap_or_default();
        Self::new(start)
    }

    pub fn set(&self, at: NaiveDateTime) {
        *self.lock() = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    pub fn advance_ms(&self, ms: i64) {
        self.advance(Duration::milliseconds(ms));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        // A poisoned clock still holds a valid timestamp.
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.lock().and_utc().timestamp_millis()
    }

    fn local_now(&self) -> NaiveDateTime {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn manual_clock_advances_both_readings() {
        let clock = ManualClock::at_hm(9, 30);
        let before = clock.now_ms();
        clock.advance_ms(1_500);
        assert_eq!(clock.now_ms() - before, 1_500);
        assert_eq!(clock.local_now().minute(), 30);
        assert_eq!(clock.local_now().second(), 1);
    }

    #[test]
    fn manual_clock_can_be_set_backwards() {
        let clock = ManualClock::at_hm(12, 0);
        let later = clock.local_now();
        clock.set(later - Duration::hours(1));
        assert_eq!(clock.local_now().hour(), 11);
    }

    #[test]
    fn timestamp_matches_epoch_ms() {
        let clock = ManualClock::at_hm(0, 0);
        assert_eq!(timestamp(clock.now_ms()).timestamp_millis(), clock.now_ms());
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
