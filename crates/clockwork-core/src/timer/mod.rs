mod countdown;
mod format;
mod stopwatch;

pub use countdown::{Countdown, CountdownSnapshot, DEFAULT_DURATION_SECS, DEFAULT_TICK_MS};
pub use format::{format_countdown, format_stopwatch, STOPWATCH_DISPLAY_MAX_MS};
pub use stopwatch::{Stopwatch, StopwatchRecord, StopwatchSnapshot, DEFAULT_SAMPLE_MS};
