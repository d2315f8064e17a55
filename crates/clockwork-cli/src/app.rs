//! Wiring shared by every command: configuration, store, clock, notifier.

use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use clockwork_core::storage::{self, NotificationsConfig};
use clockwork_core::{Clockwork, Config, Event, Notifier, SystemClock};
use serde::Serialize;

use crate::player;

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// Poll loops never spin faster than this.
const MIN_POLL_MS: u64 = 10;

/// Open the engines over the configured store with the system clock.
pub fn open(config: &Config) -> Clockwork {
    let persistence = Arc::new(storage::open_configured(&config.storage));
    let notifier = Notifier::from_config(player::default_player(), &resolve_sound(config));
    Clockwork::open(Arc::new(SystemClock), persistence, config).with_notifier(notifier)
}

/// Load the configuration and open the engines.
pub fn open_default() -> (Config, Clockwork) {
    let config = Config::load_or_default();
    let clockwork = open(&config);
    if clockwork.is_memory_only() {
        eprintln!("warning: store unavailable, changes will not be saved");
    }
    (config, clockwork)
}

/// Relative sound paths are looked up in the data directory.
fn resolve_sound(config: &Config) -> NotificationsConfig {
    let mut notifications = config.notifications.clone();
    if let Some(path) = &notifications.sound_file {
        if path.is_relative() {
            if let Ok(dir) = storage::data_dir() {
                notifications.sound_file = Some(dir.join(path));
            }
        }
    }
    notifications
}

/// The fastest period any engine needs, so one interval serves them all.
pub fn poll_period(config: &Config) -> Duration {
    let ms = config
        .countdown
        .tick_ms
        .min(config.stopwatch.sample_ms)
        .min(config.alarms.scan_ms)
        .max(MIN_POLL_MS);
    Duration::from_millis(ms)
}

/// Interval for loops that only ring alarms.
pub fn scan_period(config: &Config) -> Duration {
    Duration::from_millis(config.alarms.scan_ms.max(MIN_POLL_MS))
}

/// Drive a foreground loop on a current-thread runtime.
///
/// The runtime is shut down without waiting, so a stdin read left pending
/// on the blocking pool cannot hold the process open.
pub fn block_on<F>(future: F) -> CliResult
where
    F: Future<Output = CliResult>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(future);
    rt.shutdown_background();
    result
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One human-readable line per event.
pub fn describe(event: &Event) -> String {
    use clockwork_core::{format_countdown, format_stopwatch};

    match event {
        Event::CountdownStarted { remaining_secs, .. } => {
            format!("countdown started at {}", format_countdown(*remaining_secs))
        }
        Event::CountdownStopped { remaining_secs, .. } => {
            format!("countdown stopped at {}", format_countdown(*remaining_secs))
        }
        Event::CountdownReset { target_secs, .. } => {
            format!("countdown reset to {}", format_countdown(*target_secs))
        }
        Event::CountdownDurationSet { target_secs, .. } => {
            format!("countdown set to {}", format_countdown(*target_secs))
        }
        Event::CountdownCompleted { label, .. } => match label {
            Some(label) => format!("countdown '{label}' finished"),
            None => "countdown finished".to_string(),
        },
        Event::StopwatchStarted { elapsed_ms, .. } => {
            format!("stopwatch started at {}", format_stopwatch(*elapsed_ms as i64))
        }
        Event::StopwatchStopped { elapsed_ms, .. } => {
            format!("stopwatch stopped at {}", format_stopwatch(*elapsed_ms as i64))
        }
        Event::StopwatchReset { .. } => "stopwatch reset".to_string(),
        Event::StopwatchResumed { elapsed_ms, .. } => {
            format!("stopwatch resumed at {}", format_stopwatch(*elapsed_ms as i64))
        }
        Event::LapRecorded {
            lap_number,
            elapsed_ms,
            ..
        } => format!("lap {lap_number}: {}", format_stopwatch(*elapsed_ms as i64)),
        Event::AlarmAdded { id, time, label, .. } => format!("alarm {id} added: {time} {label}"),
        Event::AlarmEdited { id, time, label, .. } => format!("alarm {id} edited: {time} {label}"),
        Event::AlarmDeleted { id, .. } => format!("alarm {id} deleted"),
        Event::AlarmsCleared { count, .. } => format!("{count} alarm(s) cleared"),
        Event::AlarmFired { time, label, .. } => format!("ALARM {time} {label}"),
    }
}
