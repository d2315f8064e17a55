//! Integration tests for alarm firing through the `Clockwork` facade.
//!
//! A manual clock walks through the day minute by minute; the notifier is
//! backed by a recording player.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use clockwork_core::{
    Clockwork, Config, Event, ManualClock, MemoryStore, Notifier, Persistence, PlaybackError,
    Player, Tone,
};

#[derive(Clone, Default)]
struct RecordingPlayer {
    plays: Rc<RefCell<Vec<&'static str>>>,
    file_works: bool,
}

impl Player for RecordingPlayer {
    fn play_file(&self, _path: &Path) -> Result<(), PlaybackError> {
        if self.file_works {
            self.plays.borrow_mut().push("file");
            Ok(())
        } else {
            Err(PlaybackError::Blocked("autoplay blocked".into()))
        }
    }

    fn play_tone(&self, _tone: &Tone) -> Result<(), PlaybackError> {
        self.plays.borrow_mut().push("tone");
        Ok(())
    }
}

fn setup(start_h: u32, start_m: u32) -> (Clockwork, Arc<ManualClock>, RecordingPlayer) {
    let clock = Arc::new(ManualClock::new(
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(start_h, start_m, 0)
            .unwrap(),
    ));
    let persistence = Arc::new(Persistence::new(Arc::new(MemoryStore::new())));
    let player = RecordingPlayer::default();
    let config = Config::default();
    let notifier = Notifier::from_config(Box::new(player.clone()), &config.notifications);
    let cw = Clockwork::open(clock.clone(), persistence, &config).with_notifier(notifier);
    (cw, clock, player)
}

/// Poll every second for `secs` seconds, collecting alarm fires.
fn run_for(cw: &mut Clockwork, clock: &ManualClock, secs: i64) -> Vec<(u64, String)> {
    let mut fired = Vec::new();
    for _ in 0..secs {
        clock.advance(Duration::seconds(1));
        for event in cw.poll() {
            if let Event::AlarmFired { id, label, .. } = event {
                fired.push((id, label));
            }
        }
    }
    fired
}

#[test]
fn standup_scenario_fires_once_and_again_next_day() {
    let (mut cw, clock, player) = setup(9, 28);

    cw.add_alarm("09:30", "Standup").unwrap();
    assert_eq!(cw.alarms().len(), 1);
    let id = cw.alarms().list()[0].id;
    assert!(!cw.alarms().list()[0].triggered);

    // 09:28:00 -> 09:30:59
    let fired = run_for(&mut cw, &clock, 179);
    assert_eq!(fired, vec![(id, "Standup".to_string())]);
    assert!(cw.alarms().get(id).unwrap().triggered);

    // Into 09:31 the alarm re-arms.
    run_for(&mut cw, &clock, 2);
    assert!(!cw.alarms().get(id).unwrap().triggered);

    // 09:31:01 -> 09:30:01 the next day.
    let until_tomorrow = 24 * 60 * 60 - 60;
    let fired = run_for(&mut cw, &clock, until_tomorrow);
    assert_eq!(fired, vec![(id, "Standup".to_string())]);

    // Primary playback was blocked both times; the tone covered it.
    assert_eq!(*player.plays.borrow(), vec!["tone", "tone"]);
}

#[test]
fn many_scans_within_the_minute_fire_once() {
    let (mut cw, clock, _) = setup(11, 59);
    cw.add_alarm("12:00", "Noon").unwrap();
    let mut count = 0;
    // 250 ms polls across two minutes.
    for _ in 0..480 {
        clock.advance_ms(250);
        count += cw
            .poll()
            .iter()
            .filter(|e| matches!(e, Event::AlarmFired { .. }))
            .count();
    }
    assert_eq!(count, 1);
}

#[test]
fn edit_rearms_a_fired_alarm() {
    let (mut cw, clock, _) = setup(7, 0);
    cw.add_alarm("07:00", "Wake").unwrap();
    let id = cw.alarms().list()[0].id;
    assert_eq!(run_for(&mut cw, &clock, 1).len(), 1);

    // Editing inside the same minute, keeping the time, arms it again.
    cw.edit_alarm(id, "07:00", "Wake up").unwrap();
    let fired = run_for(&mut cw, &clock, 2);
    assert_eq!(fired, vec![(id, "Wake up".to_string())]);
}

#[test]
fn delete_and_clear_stop_future_fires() {
    let (mut cw, clock, _) = setup(6, 0);
    cw.add_alarm("06:01", "a").unwrap();
    cw.add_alarm("06:02", "b").unwrap();
    let first = cw.alarms().list()[0].id;

    assert!(cw.delete_alarm(first).is_some());
    assert!(cw.delete_alarm(first).is_none());
    assert!(cw.clear_all_alarms(false).is_err());
    assert_eq!(cw.alarms().len(), 1);
    cw.clear_all_alarms(true).unwrap();

    assert!(run_for(&mut cw, &clock, 180).is_empty());
}

#[test]
fn countdown_completion_is_notified() {
    let (mut cw, clock, player) = setup(10, 0);
    cw.set_countdown_duration(3).unwrap();
    cw.start_countdown();
    // Rapid double-start does nothing extra.
    assert!(cw.start_countdown().is_none());

    let mut done = 0;
    for _ in 0..10 {
        clock.advance(Duration::seconds(1));
        done += cw
            .poll()
            .iter()
            .filter(|e| matches!(e, Event::CountdownCompleted { .. }))
            .count();
    }
    assert_eq!(done, 1);
    assert_eq!(*player.plays.borrow(), vec!["tone"]);
}
