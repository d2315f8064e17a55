use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use clockwork_core::{format_stopwatch, Clockwork, Config, Event};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::app::{self, CliResult};

#[derive(Subcommand)]
pub enum StopwatchAction {
    /// Start (or resume) the stopwatch; time only accrues while
    /// `stopwatch watch` or `shell` is running
    Start,
    /// Stop the stopwatch; time since the last live session is not counted
    Stop,
    /// Zero the stopwatch and drop all laps
    Reset,
    /// Record a lap at the elapsed time last sampled by a live session
    Lap,
    /// Print the stopwatch state
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Show a live display; Enter records a lap, `q` stops, Ctrl-C detaches
    Watch,
}

pub fn run(action: StopwatchAction) -> CliResult {
    let (config, mut cw) = app::open_default();
    let event = match action {
        StopwatchAction::Start => cw.start_stopwatch(),
        StopwatchAction::Stop => cw.stop_stopwatch(),
        StopwatchAction::Reset => Some(cw.reset_stopwatch()),
        StopwatchAction::Lap => cw.add_lap(),
        StopwatchAction::Status { json } => {
            let snapshot = cw.stopwatch().snapshot();
            if json {
                return app::print_json(&snapshot);
            }
            let state = if snapshot.running { "running" } else { "stopped" };
            println!("{} ({state})", snapshot.display);
            for (i, split) in cw.stopwatch().lap_splits().iter().enumerate() {
                let total = cw.stopwatch().laps()[i];
                println!(
                    "  lap {:>2}  {}  +{}",
                    i + 1,
                    format_stopwatch(total as i64),
                    format_stopwatch(*split as i64)
                );
            }
            return Ok(());
        }
        StopwatchAction::Watch => return watch(&config, cw),
    };
    match event {
        Some(event) => println!("{}", app::describe(&event)),
        None => println!("no change"),
    }
    Ok(())
}

fn watch(config: &Config, mut cw: Clockwork) -> CliResult {
    cw.start_stopwatch();
    let period = app::poll_period(config);
    app::block_on(watch_loop(cw, period))
}

async fn watch_loop(mut cw: Clockwork, period: Duration) -> CliResult {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                // Left running; the next session resumes from here.
                println!();
                break;
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(input) if input.trim() == "q" => {
                        if let Some(event) = cw.stop_stopwatch() {
                            println!("\r{}", app::describe(&event));
                        }
                        break;
                    }
                    Some(_) => {
                        if let Some(event) = cw.add_lap() {
                            println!("\r{}", app::describe(&event));
                        }
                    }
                    None => stdin_open = false,
                }
            }
            _ = interval.tick() => {
                for event in cw.poll() {
                    if matches!(event, Event::StopwatchResumed { .. }) {
                        println!("\r{}", app::describe(&event));
                    }
                }
                print!("\r{}", cw.stopwatch().snapshot().display);
                std::io::stdout().flush()?;
            }
        }
    }
    Ok(())
}
