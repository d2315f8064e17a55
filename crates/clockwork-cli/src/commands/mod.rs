pub mod alarm;
pub mod completions;
pub mod config;
pub mod countdown;
pub mod label;
pub mod stopwatch;
pub mod theme;
