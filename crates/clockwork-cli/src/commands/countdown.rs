use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use clockwork_core::{format_countdown, Clockwork, Event};
use tokio::time::MissedTickBehavior;

use crate::app::{self, CliResult};

#[derive(Subcommand)]
pub enum CountdownAction {
    /// Run a countdown in the foreground; Ctrl-C stops it
    Run {
        /// Duration in seconds (default from config)
        #[arg(long, short)]
        seconds: Option<u64>,
        /// Saved timer label to show on completion
        #[arg(long)]
        label: Option<String>,
    },
}

pub fn run(action: CountdownAction) -> CliResult {
    match action {
        CountdownAction::Run { seconds, label } => run_foreground(seconds, label),
    }
}

fn run_foreground(seconds: Option<u64>, label: Option<String>) -> CliResult {
    let (config, mut cw) = app::open_default();
    if let Some(seconds) = seconds {
        cw.set_countdown_duration(seconds)?;
    }
    if let Some(label) = &label {
        if !cw.select_label(Some(label.as_str())) {
            return Err(format!("unknown label '{label}', add it with `clockwork label add`").into());
        }
    }
    cw.start_countdown();

    let period = app::poll_period(&config);
    app::block_on(tick_down(cw, period))
}

async fn tick_down(mut cw: Clockwork, period: Duration) -> CliResult {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut shown = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                if let Some(event) = cw.stop_countdown() {
                    println!();
                    println!("{}", app::describe(&event));
                }
                break;
            }
            _ = interval.tick() => {
                let events = cw.poll();
                let remaining = cw.countdown().remaining_secs();
                if shown != Some(remaining) {
                    shown = Some(remaining);
                    print!("\r{}", format_countdown(remaining));
                    std::io::stdout().flush()?;
                }
                if let Some(done) = events
                    .iter()
                    .find(|e| matches!(e, Event::CountdownCompleted { .. }))
                {
                    println!();
                    println!("{}", app::describe(done));
                    break;
                }
            }
        }
    }
    Ok(())
}
