//! The command and query surface for presentation layers.
//!
//! [`Clockwork`] owns one of each engine, wires them to a shared clock and
//! store, and runs all periodic work from a single [`Clockwork::poll`]. The
//! caller decides how often to poll; within one poll the engines run in a
//! fixed order and never overlap.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alarm::{Alarm, AlarmId, AlarmRegistry};
use crate::clock::Clock;
use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;
use crate::labels::TimerLabels;
use crate::notify::Notifier;
use crate::storage::{Config, Persistence};
use crate::theme::Theme;
use crate::timer::{Countdown, CountdownSnapshot, Stopwatch, StopwatchSnapshot};

/// Which tool the presentation layer currently shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Countdown,
    Stopwatch,
    Alarm,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            View::Countdown => "countdown",
            View::Stopwatch => "stopwatch",
            View::Alarm => "alarm",
        })
    }
}

impl FromStr for View {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "countdown" | "timer" => Ok(View::Countdown),
            "stopwatch" => Ok(View::Stopwatch),
            "alarm" | "alarms" => Ok(View::Alarm),
            other => Err(CoreError::Custom(format!("unknown view '{other}'"))),
        }
    }
}

/// Commands a presentation layer can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    StartCountdown,
    StopCountdown,
    ResetCountdown,
    SetCountdownDuration { seconds: u64 },
    SelectLabel { name: Option<String> },
    StartStopwatch,
    StopStopwatch,
    ResetStopwatch,
    AddLap,
    AddAlarm { time: String, label: String },
    EditAlarm { id: AlarmId, time: String, label: String },
    DeleteAlarm { id: AlarmId },
    ClearAllAlarms { confirmed: bool },
    AddLabel { name: String },
    RenameLabel { from: String, to: String },
    DeleteLabel { name: String },
    SetTheme { theme: Theme },
    ToggleTheme,
    SetView { view: View },
}

/// Everything a renderer needs, in one serialisable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub view: View,
    pub theme: Theme,
    pub countdown: CountdownSnapshot,
    pub stopwatch: StopwatchSnapshot,
    pub alarms: Vec<Alarm>,
    pub labels: Vec<String>,
    /// `true` when the store failed and nothing more is being saved.
    pub memory_only: bool,
}

pub struct Clockwork {
    clock: Arc<dyn Clock>,
    persistence: Arc<Persistence>,
    countdown: Countdown,
    stopwatch: Stopwatch,
    alarms: AlarmRegistry,
    labels: TimerLabels,
    theme: Theme,
    view: View,
    notifier: Option<Notifier>,
    /// Events raised while opening, handed out by the first poll.
    pending: Vec<Event>,
}

impl Clockwork {
    /// Load all persisted state. A stopwatch saved while running resumes,
    /// and its [`Event::StopwatchResumed`] is returned by the first
    /// [`Clockwork::poll`].
    pub fn open(clock: Arc<dyn Clock>, persistence: Arc<Persistence>, config: &Config) -> Self {
        let now_ms = clock.now_ms();
        let countdown = Countdown::new(config.countdown.default_duration_secs)
            .with_tick_period(config.countdown.tick_ms);
        let (stopwatch, resumed) =
            Stopwatch::load(persistence.clone(), config.stopwatch.sample_ms, now_ms);
        let alarms = AlarmRegistry::load(persistence.clone(), config.alarms.scan_ms, now_ms);
        let labels = TimerLabels::load(persistence.clone());
        let theme = Theme::load(&persistence);
        if let Some(Event::StopwatchResumed { elapsed_ms, .. }) = &resumed {
            debug!(elapsed_ms, "opened with a running stopwatch");
        }
        info!(alarms = alarms.len(), labels = labels.list().len(), %theme, "clockwork opened");
        Self {
            clock,
            persistence,
            countdown,
            stopwatch,
            alarms,
            labels,
            theme,
            view: View::default(),
            notifier: None,
            pending: resumed.into_iter().collect(),
        }
    }

    /// Route fire events from [`Clockwork::poll`] to `notifier`.
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn alarms(&self) -> &AlarmRegistry {
        &self.alarms
    }

    pub fn labels(&self) -> &TimerLabels {
        &self.labels
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn is_memory_only(&self) -> bool {
        self.persistence.is_degraded()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            view: self.view,
            theme: self.theme,
            countdown: self.countdown.snapshot(),
            stopwatch: self.stopwatch.snapshot(),
            alarms: self.alarms.list().to_vec(),
            labels: self.labels.list().to_vec(),
            memory_only: self.is_memory_only(),
        }
    }

    // ── Periodic work ────────────────────────────────────────────────

    /// Run whatever periodic work is due: countdown tick, stopwatch sample,
    /// alarm scan. Fire events are also handed to the notifier.
    pub fn poll(&mut self) -> Vec<Event> {
        let now_ms = self.clock.now_ms();
        let local = self.clock.local_now();
        let mut events = std::mem::take(&mut self.pending);

        if let Some(event) = self.countdown.poll(now_ms) {
            events.push(event);
        }
        self.stopwatch.poll(now_ms);
        events.extend(self.alarms.poll(&local, now_ms));

        if let Some(notifier) = &self.notifier {
            for event in &events {
                notifier.notify(event);
            }
        }
        events
    }

    /// Re-read alarms from the store so edits made by another process are
    /// seen before the next scan. See [`AlarmRegistry::reload`].
    pub fn reload_alarms(&mut self) -> bool {
        self.alarms.reload()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_countdown(&mut self) -> Option<Event> {
        self.countdown.start(self.clock.now_ms())
    }

    pub fn stop_countdown(&mut self) -> Option<Event> {
        self.countdown.stop(self.clock.now_ms())
    }

    pub fn reset_countdown(&mut self) -> Event {
        self.countdown.reset(self.clock.now_ms())
    }

    pub fn set_countdown_duration(&mut self, seconds: u64) -> Result<Event, ValidationError> {
        self.countdown.set_duration(seconds, self.clock.now_ms())
    }

    /// Pair a saved label with the countdown, or clear the pairing.
    /// Unknown names are ignored and return `false`.
    pub fn select_label(&mut self, name: Option<&str>) -> bool {
        match name {
            Some(name) if !self.labels.contains(name) => false,
            Some(name) => {
                self.countdown.select_label(Some(name.trim().to_string()));
                true
            }
            None => {
                self.countdown.select_label(None);
                true
            }
        }
    }

    pub fn start_stopwatch(&mut self) -> Option<Event> {
        self.stopwatch.start(self.clock.now_ms())
    }

    pub fn stop_stopwatch(&mut self) -> Option<Event> {
        self.stopwatch.stop(self.clock.now_ms())
    }

    pub fn reset_stopwatch(&mut self) -> Event {
        self.stopwatch.reset(self.clock.now_ms())
    }

    pub fn add_lap(&mut self) -> Option<Event> {
        self.stopwatch.lap(self.clock.now_ms())
    }

    pub fn add_alarm(&mut self, time: &str, label: &str) -> Result<Event, ValidationError> {
        self.alarms.add(time, label, self.clock.now_ms())
    }

    pub fn edit_alarm(
        &mut self,
        id: AlarmId,
        time: &str,
        label: &str,
    ) -> Result<Option<Event>, ValidationError> {
        self.alarms.edit(id, time, label, self.clock.now_ms())
    }

    pub fn delete_alarm(&mut self, id: AlarmId) -> Option<Event> {
        self.alarms.delete(id, self.clock.now_ms())
    }

    pub fn clear_all_alarms(&mut self, confirmed: bool) -> Result<Event, ValidationError> {
        self.alarms.clear_all(confirmed, self.clock.now_ms())
    }

    pub fn add_label(&mut self, name: &str) -> Result<String, ValidationError> {
        self.labels.add(name)
    }

    /// Rename a label, keeping the countdown pairing if it was selected.
    pub fn rename_label(&mut self, from: &str, to: &str) -> Result<bool, ValidationError> {
        let renamed = self.labels.rename(from, to)?;
        if renamed && self.countdown.label() == Some(from.trim()) {
            self.countdown.select_label(Some(to.trim().to_string()));
        }
        Ok(renamed)
    }

    pub fn delete_label(&mut self, name: &str) -> bool {
        let removed = self.labels.delete(name);
        if removed && self.countdown.label() == Some(name.trim()) {
            self.countdown.select_label(None);
        }
        removed
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        theme.save(&self.persistence);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggled());
        self.theme
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    /// Apply a [`Command`]. Rejected input surfaces as `Err` with nothing
    /// changed; commands that had no effect return no events.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<Event>> {
        let event = match command {
            Command::StartCountdown => self.start_countdown(),
            Command::StopCountdown => self.stop_countdown(),
            Command::ResetCountdown => Some(self.reset_countdown()),
            Command::SetCountdownDuration { seconds } => {
                Some(self.set_countdown_duration(seconds)?)
            }
            Command::SelectLabel { name } => {
                self.select_label(name.as_deref());
                None
            }
            Command::StartStopwatch => self.start_stopwatch(),
            Command::StopStopwatch => self.stop_stopwatch(),
            Command::ResetStopwatch => Some(self.reset_stopwatch()),
            Command::AddLap => self.add_lap(),
            Command::AddAlarm { time, label } => Some(self.add_alarm(&time, &label)?),
            Command::EditAlarm { id, time, label } => self.edit_alarm(id, &time, &label)?,
            Command::DeleteAlarm { id } => self.delete_alarm(id),
            Command::ClearAllAlarms { confirmed } => Some(self.clear_all_alarms(confirmed)?),
            Command::AddLabel { name } => {
                self.add_label(&name)?;
                None
            }
            Command::RenameLabel { from, to } => {
                self.rename_label(&from, &to)?;
                None
            }
            Command::DeleteLabel { name } => {
                self.delete_label(&name);
                None
            }
            Command::SetTheme { theme } => {
                self.set_theme(theme);
                None
            }
            Command::ToggleTheme => {
                self.toggle_theme();
                None
            }
            Command::SetView { view } => {
                self.set_view(view);
                None
            }
        };
        Ok(event.into_iter().collect())
    }
}

impl fmt::Debug for Clockwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clockwork")
            .field("view", &self.view)
            .field("theme", &self.theme)
            .field("countdown", &self.countdown)
            .field("stopwatch", &self.stopwatch)
            .field("alarms", &self.alarms)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}
