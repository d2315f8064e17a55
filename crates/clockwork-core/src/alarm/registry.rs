//! The set of scheduled alarms.
//!
//! The scan runs on an always-armed one-second ticker. An alarm fires when
//! the current minute equals its time and it is not already triggered; as
//! soon as the minute moves on the flag is cleared again, so the same alarm
//! fires once per day.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::{Alarm, AlarmId, AlarmTime};
use crate::clock::timestamp;
use crate::error::ValidationError;
use crate::events::Event;
use crate::storage::{keys, Persistence};
use crate::ticker::Ticker;

pub const DEFAULT_SCAN_MS: u64 = 1000;

#[derive(Debug)]
pub struct AlarmRegistry {
    alarms: Vec<Alarm>,
    last_id: AlarmId,
    scan: Ticker,
    persistence: Arc<Persistence>,
}

impl AlarmRegistry {
    /// An empty registry. Nothing is read from the store.
    pub fn new(persistence: Arc<Persistence>, scan_ms: u64, now_ms: i64) -> Self {
        Self {
            alarms: Vec::new(),
            last_id: 0,
            scan: Ticker::arm_immediate(scan_ms, now_ms),
            persistence,
        }
    }

    /// Restore the registry from the store. Malformed entries are skipped.
    pub fn load(persistence: Arc<Persistence>, scan_ms: u64, now_ms: i64) -> Self {
        let raw: Vec<serde_json::Value> = persistence.load(keys::ALARMS).unwrap_or_default();
        let mut registry = Self::new(persistence, scan_ms, now_ms);
        registry.restore(raw);
        debug!(count = registry.alarms.len(), "alarms loaded");
        registry
    }

    /// Replace the in-memory list with the stored one, picking up changes
    /// another process made to the same store.
    ///
    /// Returns `false` and keeps the current list when the session is
    /// memory-only or the read fails.
    pub fn reload(&mut self) -> bool {
        if self.persistence.is_degraded() {
            return false;
        }
        let raw: Option<Vec<serde_json::Value>> = self.persistence.load(keys::ALARMS);
        if self.persistence.is_degraded() {
            return false;
        }
        self.alarms.clear();
        self.restore(raw.unwrap_or_default());
        true
    }

    fn restore(&mut self, raw: Vec<serde_json::Value>) {
        for value in raw {
            match serde_json::from_value::<Alarm>(value) {
                Ok(alarm) if self.get(alarm.id).is_none() => {
                    self.last_id = self.last_id.max(alarm.id);
                    self.alarms.push(alarm);
                }
                Ok(alarm) => warn!(alarm_id = alarm.id, "dropping duplicate stored alarm"),
                Err(e) => warn!(error = %e, "dropping malformed stored alarm"),
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn list(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    /// The alarm that fires next after `now`, with the seconds until it.
    /// An untriggered alarm in the current minute is due now (0).
    pub fn next_due(&self, now: &NaiveDateTime) -> Option<(&Alarm, i64)> {
        let current = AlarmTime::of(now);
        self.alarms
            .iter()
            .map(|a| {
                let secs = if a.time == current && !a.triggered {
                    0
                } else {
                    a.time.secs_until_next(now)
                };
                (a, secs)
            })
            .min_by_key(|&(_, secs)| secs)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn add(&mut self, time: &str, label: &str, now_ms: i64) -> Result<Event, ValidationError> {
        let time: AlarmTime = time.parse()?;
        let id = self.next_id(now_ms);
        let alarm = Alarm::new(id, time, label);
        info!(alarm_id = id, time = %time, label = %alarm.label, "alarm added");
        let event = Event::AlarmAdded {
            id,
            time,
            label: alarm.label.clone(),
            at: timestamp(now_ms),
        };
        self.alarms.push(alarm);
        self.persist();
        Ok(event)
    }

    /// Replace time and label and re-arm. Unknown ids are ignored.
    pub fn edit(
        &mut self,
        id: AlarmId,
        time: &str,
        label: &str,
        now_ms: i64,
    ) -> Result<Option<Event>, ValidationError> {
        let Some(index) = self.alarms.iter().position(|a| a.id == id) else {
            debug!(alarm_id = id, "edit of unknown alarm ignored");
            return Ok(None);
        };
        let time: AlarmTime = time.parse()?;
        let updated = Alarm::new(id, time, label);
        let event = Event::AlarmEdited {
            id,
            time,
            label: updated.label.clone(),
            at: timestamp(now_ms),
        };
        self.alarms[index] = updated;
        self.persist();
        Ok(Some(event))
    }

    /// Remove an alarm. Deleting an unknown id is a no-op.
    pub fn delete(&mut self, id: AlarmId, now_ms: i64) -> Option<Event> {
        let before = self.alarms.len();
        self.alarms.retain(|a| a.id != id);
        if self.alarms.len() == before {
            return None;
        }
        self.persist();
        Some(Event::AlarmDeleted {
            id,
            at: timestamp(now_ms),
        })
    }

    /// Remove every alarm. The caller must have confirmed with the user.
    pub fn clear_all(&mut self, confirmed: bool, now_ms: i64) -> Result<Event, ValidationError> {
        if !confirmed {
            return Err(ValidationError::ConfirmationRequired);
        }
        let count = self.alarms.len();
        self.alarms.clear();
        self.persist();
        info!(count, "alarms cleared");
        Ok(Event::AlarmsCleared {
            count,
            at: timestamp(now_ms),
        })
    }

    /// Compare every alarm against the minute `now` falls in.
    ///
    /// Returns one `AlarmFired` per alarm that entered its minute since the
    /// last scan. Repeated scans within the minute fire nothing.
    pub fn scan(&mut self, now: &NaiveDateTime, now_ms: i64) -> Vec<Event> {
        let current = AlarmTime::of(now);
        let mut fired = Vec::new();
        let mut changed = false;

        for alarm in &mut self.alarms {
            if alarm.time == current {
                if !alarm.triggered {
                    alarm.triggered = true;
                    changed = true;
                    info!(alarm_id = alarm.id, label = %alarm.label, time = %alarm.time, "alarm fired");
                    fired.push(Event::AlarmFired {
                        id: alarm.id,
                        time: alarm.time,
                        label: alarm.label.clone(),
                        at: timestamp(now_ms),
                    });
                }
            } else if alarm.triggered {
                alarm.triggered = false;
                changed = true;
                debug!(alarm_id = alarm.id, "alarm re-armed");
            }
        }

        if changed {
            self.persist();
        }
        fired
    }

    /// Scan if the scan period has elapsed.
    pub fn poll(&mut self, now: &NaiveDateTime, now_ms: i64) -> Vec<Event> {
        if self.scan.due(now_ms) {
            self.scan(now, now_ms)
        } else {
            Vec::new()
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Timestamp-based ids, bumped past the last one so rapid adds and
    /// clock steps cannot collide.
    fn next_id(&mut self, now_ms: i64) -> AlarmId {
        let candidate = u64::try_from(now_ms).unwrap_or(0);
        let id = candidate.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }

    fn persist(&self) {
        self.persistence.save(keys::ALARMS, &self.alarms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::DEFAULT_LABEL;
    use crate::storage::{KvStore, MemoryStore};
    use chrono::{Duration, NaiveDate};

    fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn registry() -> (AlarmRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let p = Arc::new(Persistence::new(store.clone()));
        (AlarmRegistry::new(p, DEFAULT_SCAN_MS, 0), store)
    }

    #[test]
    fn add_assigns_fresh_ids_and_default_label() {
        let (mut reg, _) = registry();
        reg.add("07:00", "", 1_000).unwrap();
        reg.add("08:00", "  ", 1_000).unwrap();
        let ids: Vec<_> = reg.list().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1_000, 1_001]);
        assert!(reg.list().iter().all(|a| a.label == DEFAULT_LABEL));
        assert!(reg.list().iter().all(|a| !a.triggered));
    }

    #[test]
    fn reload_picks_up_alarms_written_elsewhere() {
        let store = Arc::new(MemoryStore::new());
        let p = Arc::new(Persistence::new(store.clone()));
        let mut watcher = AlarmRegistry::new(p.clone(), DEFAULT_SCAN_MS, 0);
        watcher.add("07:00", "Wake", 10).unwrap();

        let mut other = AlarmRegistry::load(p, DEFAULT_SCAN_MS, 0);
        other.add("22:00", "Bed", 20).unwrap();

        assert!(watcher.reload());
        assert_eq!(watcher.len(), 2);
        watcher.scan(&at(1, 7, 0, 0), 30);
        let stored: Vec<Alarm> = serde_json::from_str(&store.peek(keys::ALARMS).unwrap()).unwrap();
        let labels: Vec<_> = stored.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Wake", "Bed"]);
        assert!(stored[0].triggered);

        // New ids stay ahead of everything reloaded.
        watcher.add("23:00", "Late", 0).unwrap();
        assert!(watcher.list()[2].id > 20);
    }

    #[test]
    fn reload_keeps_list_when_store_fails() {
        let (mut reg, store) = registry();
        reg.add("07:00", "Wake", 1).unwrap();
        store.set_available(false);
        assert!(!reg.reload());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn add_rejects_missing_or_bad_time() {
        let (mut reg, store) = registry();
        assert_eq!(
            reg.add("", "Wake", 0),
            Err(ValidationError::EmptyAlarmTime)
        );
        assert!(matches!(
            reg.add("25:00", "Wake", 0),
            Err(ValidationError::InvalidAlarmTime(_))
        ));
        assert!(reg.is_empty());
        assert!(store.peek(keys::ALARMS).is_none());
    }

    #[test]
    fn edit_overwrites_and_rearms() {
        let (mut reg, _) = registry();
        reg.add("12:00", "Lunch", 1).unwrap();
        let id = reg.list()[0].id;
        reg.scan(&at(1, 12, 0, 0), 2);
        assert!(reg.get(id).unwrap().triggered);

        let ev = reg.edit(id, "12:30", "Late lunch", 3).unwrap();
        assert!(matches!(ev, Some(Event::AlarmEdited { .. })));
        let alarm = reg.get(id).unwrap();
        assert_eq!(alarm.time.to_string(), "12:30");
        assert_eq!(alarm.label, "Late lunch");
        assert!(!alarm.triggered);
    }

    #[test]
    fn edit_unknown_id_is_silent() {
        let (mut reg, _) = registry();
        assert_eq!(reg.edit(42, "10:00", "x", 0), Ok(None));
        assert_eq!(reg.edit(42, "garbage", "x", 0), Ok(None));
    }

    #[test]
    fn edit_with_bad_time_keeps_alarm() {
        let (mut reg, _) = registry();
        reg.add("06:00", "Run", 1).unwrap();
        let id = reg.list()[0].id;
        assert!(reg.edit(id, "6pm", "Run", 2).is_err());
        assert_eq!(reg.get(id).unwrap().time.to_string(), "06:00");
    }

    #[test]
    fn delete_is_idempotent() {
        let (mut reg, store) = registry();
        reg.add("06:00", "a", 1).unwrap();
        reg.add("07:00", "b", 2).unwrap();
        let id = reg.list()[0].id;
        assert!(reg.delete(id, 3).is_some());
        let after_once = store.peek(keys::ALARMS);
        assert!(reg.delete(id, 4).is_none());
        assert_eq!(store.peek(keys::ALARMS), after_once);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn clear_all_requires_confirmation() {
        let (mut reg, _) = registry();
        reg.add("06:00", "a", 1).unwrap();
        assert_eq!(
            reg.clear_all(false, 2),
            Err(ValidationError::ConfirmationRequired)
        );
        assert_eq!(reg.len(), 1);
        assert!(matches!(
            reg.clear_all(true, 3),
            Ok(Event::AlarmsCleared { count: 1, .. })
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn fires_once_per_minute_and_rearms_next_day() {
        let (mut reg, _) = registry();
        reg.add("12:00", "Noon", 1).unwrap();

        assert!(reg.scan(&at(1, 11, 59, 59), 0).is_empty());
        assert_eq!(reg.scan(&at(1, 12, 0, 0), 0).len(), 1);
        for s in 1..60 {
            assert!(reg.scan(&at(1, 12, 0, s), 0).is_empty());
        }
        assert!(reg.scan(&at(1, 12, 1, 0), 0).is_empty());
        assert!(!reg.list()[0].triggered);

        assert_eq!(reg.scan(&at(2, 12, 0, 0), 0).len(), 1);
    }

    #[test]
    fn independent_alarms_fire_together() {
        let (mut reg, _) = registry();
        reg.add("08:00", "a", 1).unwrap();
        reg.add("08:00", "b", 2).unwrap();
        reg.add("09:00", "c", 3).unwrap();
        let fired = reg.scan(&at(1, 8, 0, 5), 0);
        let labels: Vec<_> = fired
            .iter()
            .filter_map(|e| match e {
                Event::AlarmFired { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn scan_persists_only_on_change() {
        let (mut reg, store) = registry();
        reg.add("12:00", "Noon", 1).unwrap();
        store.remove(keys::ALARMS).unwrap();
        reg.scan(&at(1, 10, 0, 0), 0);
        assert!(store.peek(keys::ALARMS).is_none());
        reg.scan(&at(1, 12, 0, 0), 0);
        assert!(store.peek(keys::ALARMS).unwrap().contains("\"triggered\":true"));
    }

    #[test]
    fn poll_scans_every_period() {
        let (mut reg, _) = registry();
        reg.add("12:00", "Noon", 1).unwrap();
        let noon = at(1, 12, 0, 0);
        assert_eq!(reg.poll(&noon, 0).len(), 1);
        assert!(reg.poll(&(noon + Duration::milliseconds(500)), 500).is_empty());
        assert!(reg.poll(&(noon + Duration::seconds(1)), 1_000).is_empty());
        assert!(reg.list()[0].triggered);
    }

    #[test]
    fn load_restores_and_skips_malformed() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                keys::ALARMS,
                r#"[
                    {"id":5,"time":"09:30","label":"Standup","triggered":false},
                    {"id":6,"time":"bogus","label":"x","triggered":false},
                    {"id":5,"time":"10:00","label":"dup","triggered":false},
                    {"id":9,"time":"21:15","label":"Pills","triggered":true}
                ]"#,
            )
            .unwrap();
        let mut reg = AlarmRegistry::load(Arc::new(Persistence::new(store)), 1000, 0);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(5).unwrap().label, "Standup");
        assert!(reg.get(9).unwrap().triggered);
        // Ids continue past the highest stored id.
        reg.add("10:00", "new", 3).unwrap();
        assert_eq!(reg.list()[2].id, 10);
    }

    #[test]
    fn next_due_picks_soonest() {
        let (mut reg, _) = registry();
        reg.add("07:00", "a", 1).unwrap();
        reg.add("06:00", "b", 2).unwrap();
        let (alarm, secs) = reg.next_due(&at(1, 6, 30, 0)).unwrap();
        assert_eq!(alarm.label, "a");
        assert_eq!(secs, 30 * 60);

        let (alarm, secs) = reg.next_due(&at(1, 6, 0, 10)).unwrap();
        assert_eq!(alarm.label, "b");
        assert_eq!(secs, 0);
    }
}
