//! Display formatting for the presentation layer.

/// Largest stopwatch value shown: 99:59:99.
pub const STOPWATCH_DISPLAY_MAX_MS: i64 = (99 * 60 + 59) * 1000 + 990;

/// Format seconds as `MM:SS`. Minutes are not capped.
pub fn format_countdown(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format milliseconds as `MM:SS:CC` (centiseconds).
///
/// Negative values show as zero and large values are capped at
/// [`STOPWATCH_DISPLAY_MAX_MS`]. Only the string is clamped.
pub fn format_stopwatch(ms: i64) -> String {
    let ms = ms.clamp(0, STOPWATCH_DISPLAY_MAX_MS);
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let centis = (ms % 1000) / 10;
    format!("{minutes:02}:{seconds:02}:{centis:02}")
}
