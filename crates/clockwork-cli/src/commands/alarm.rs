use std::time::Duration;

use clap::Subcommand;
use clockwork_core::{AlarmId, Clockwork, Config, Event, ValidationError};
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::app::{self, CliResult};

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Add an alarm
    Add {
        /// Time of day, HH:MM (24-hour)
        time: String,
        #[arg(long, default_value = "")]
        label: String,
    },
    /// Change an alarm's time and label
    Edit {
        id: AlarmId,
        time: String,
        /// New label (kept when omitted)
        #[arg(long)]
        label: Option<String>,
    },
    /// Delete an alarm; unknown ids are left alone
    Delete { id: AlarmId },
    /// List alarms
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show the alarm that rings next
    Next,
    /// Delete every alarm
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Stay in the foreground and ring alarms as they come due; alarms
    /// added or edited from another shell are picked up on the next scan
    Watch,
}

pub fn run(action: AlarmAction) -> CliResult {
    let (config, mut cw) = app::open_default();
    match action {
        AlarmAction::Add { time, label } => {
            let event = cw.add_alarm(&time, &label)?;
            println!("{}", app::describe(&event));
        }
        AlarmAction::Edit { id, time, label } => {
            let label = match label {
                Some(label) => label,
                None => cw
                    .alarms()
                    .get(id)
                    .map(|a| a.label.clone())
                    .unwrap_or_default(),
            };
            match cw.edit_alarm(id, &time, &label)? {
                Some(event) => println!("{}", app::describe(&event)),
                None => println!("no change"),
            }
        }
        AlarmAction::Delete { id } => match cw.delete_alarm(id) {
            Some(event) => println!("{}", app::describe(&event)),
            None => println!("no change"),
        },
        AlarmAction::List { json } => {
            if json {
                return app::print_json(cw.alarms().list());
            }
            if cw.alarms().is_empty() {
                println!("no alarms");
            }
            for alarm in cw.alarms().list() {
                println!("{:>14}  {}  {}", alarm.id, alarm.time, alarm.label);
            }
        }
        AlarmAction::Next => {
            let now = cw.clock().local_now();
            match cw.alarms().next_due(&now) {
                Some((alarm, secs)) => println!(
                    "{} {} in {}h {:02}m",
                    alarm.time,
                    alarm.label,
                    secs / 3600,
                    (secs % 3600) / 60
                ),
                None => println!("no alarms"),
            }
        }
        AlarmAction::Clear { yes } => match cw.clear_all_alarms(yes) {
            Ok(event) => println!("{}", app::describe(&event)),
            Err(ValidationError::ConfirmationRequired) => {
                return Err("refusing to delete all alarms without --yes".into())
            }
            Err(e) => return Err(e.into()),
        },
        AlarmAction::Watch => return watch(&config, cw),
    }
    Ok(())
}

fn watch(config: &Config, cw: Clockwork) -> CliResult {
    println!("watching {} alarm(s), Ctrl-C to quit", cw.alarms().len());
    let period = app::scan_period(config);
    app::block_on(ring_loop(cw, period))
}

async fn ring_loop(mut cw: Clockwork, period: Duration) -> CliResult {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = interval.tick() => {
                // Other invocations share the store; scan their edits, not a stale copy.
                cw.reload_alarms();
                for event in cw.poll() {
                    if let Event::AlarmFired { id, .. } = &event {
                        info!(id, "alarm rang");
                        println!("{}", app::describe(&event));
                    }
                }
            }
        }
    }
    Ok(())
}
