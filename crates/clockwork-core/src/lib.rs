//! # Clockwork Core Library
//!
//! Countdown timer, stopwatch and multi-alarm clock engines with durable,
//! resumable state. The CLI is a thin presentation layer over this crate.
//!
//! ## Architecture
//!
//! - **Engines**: poll-driven state machines. None of them owns a thread;
//!   the caller invokes `poll()` (or `tick()`/`sample()`/`scan()`) on its
//!   own schedule
//! - **Clock**: all timestamps come from an injected [`Clock`]
//! - **Storage**: a key-value [`KvStore`] (SQLite or memory) behind
//!   [`Persistence`], which degrades to memory-only if writes fail
//! - **Notifications**: [`Notifier`] turns fire events into sound, falling
//!   back to a synthesized tone
//!
//! ## Key Components
//!
//! - [`Countdown`]: fixed-period countdown with a once-per-run completion
//! - [`Stopwatch`]: anchor-based elapsed time with laps
//! - [`AlarmRegistry`]: HH:MM alarms that fire once per day
//! - [`Clockwork`]: command/query facade over all of the above

pub mod alarm;
pub mod clock;
pub mod clockwork;
pub mod error;
pub mod events;
pub mod labels;
pub mod notify;
pub mod storage;
pub mod theme;
pub mod ticker;
pub mod timer;

pub use alarm::{Alarm, AlarmId, AlarmRegistry, AlarmTime, DEFAULT_LABEL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use clockwork::{Clockwork, Command, Snapshot, View};
pub use error::{ConfigError, CoreError, PlaybackError, StorageError, ValidationError};
pub use events::Event;
pub use labels::TimerLabels;
pub use notify::{Notifier, Playback, Player, Tone};
pub use storage::{Config, KvStore, MemoryStore, Persistence, SqliteStore};
pub use theme::Theme;
pub use timer::{format_countdown, format_stopwatch, Countdown, Stopwatch};
