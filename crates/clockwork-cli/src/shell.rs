//! Interactive session over all three tools.
//!
//! Input lines are parsed into [`Command`]s against the current [`View`];
//! meanwhile every engine is polled on one interval so countdowns finish
//! and alarms ring while the prompt waits.

use std::io::Write;
use std::time::Duration;

use clockwork_core::{format_stopwatch, AlarmId, Clockwork, Command, Theme, View};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::app::{self, CliResult};

const HELP: &str = "\
any view:   view <countdown|stopwatch|alarm>, theme [light|dark|toggle],
            show, json, help, quit
countdown:  start, stop, reset, set <seconds>, label <name|none>,
            labels add <name>, labels rename <from> <to>, labels delete <name>
stopwatch:  start, stop, reset, lap
alarm:      add <HH:MM> [label], edit <id> <HH:MM> [label], delete <id>,
            clear yes";

#[derive(Debug, PartialEq)]
enum Input {
    Empty,
    Help,
    Quit,
    Show,
    Json,
    Run(Command),
}

pub fn run(initial: View) -> CliResult {
    let (config, mut cw) = app::open_default();
    cw.set_view(initial);
    let period = app::poll_period(&config);
    let scan = app::scan_period(&config);
    app::block_on(session(cw, period, scan))
}

async fn session(mut cw: Clockwork, period: Duration, scan: Duration) -> CliResult {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Alarms may be edited by other invocations over the same store.
    let mut reload = tokio::time::interval(scan);
    reload.set_missed_tick_behavior(MissedTickBehavior::Skip);

    println!("clockwork shell, `help` for commands");
    show(&cw);
    prompt(&cw)?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(cw.view(), &line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => execute(&mut cw, input)?,
                    Err(message) => println!("{message}"),
                }
                prompt(&cw)?;
            }
            _ = reload.tick() => {
                cw.reload_alarms();
            }
            _ = interval.tick() => {
                let fired: Vec<_> = cw.poll().into_iter().filter(|e| e.is_fire()).collect();
                if !fired.is_empty() {
                    println!();
                    for event in &fired {
                        println!("{}", app::describe(event));
                    }
                    prompt(&cw)?;
                }
            }
        }
    }
    Ok(())
}

fn execute(cw: &mut Clockwork, input: Input) -> CliResult {
    match input {
        Input::Empty | Input::Quit => {}
        Input::Help => println!("{HELP}"),
        Input::Show => {
            cw.reload_alarms();
            show(cw)
        }
        Input::Json => app::print_json(&cw.snapshot())?,
        Input::Run(Command::SelectLabel { name: Some(name) }) if !cw.labels().contains(&name) => {
            println!("no label named '{name}', add it with `labels add {name}`");
        }
        Input::Run(command) => {
            debug!(?command, "shell command");
            if is_alarm_command(&command) {
                cw.reload_alarms();
            }
            let switches_view = matches!(command, Command::SetView { .. });
            match cw.dispatch(command) {
                Ok(events) if events.is_empty() && switches_view => show(cw),
                Ok(events) if events.is_empty() => println!("ok"),
                Ok(events) => {
                    for event in &events {
                        println!("{}", app::describe(event));
                    }
                }
                Err(e) => println!("error: {e}"),
            }
        }
    }
    Ok(())
}

fn is_alarm_command(command: &Command) -> bool {
    matches!(
        command,
        Command::AddAlarm { .. }
            | Command::EditAlarm { .. }
            | Command::DeleteAlarm { .. }
            | Command::ClearAllAlarms { .. }
    )
}

fn prompt(cw: &Clockwork) -> std::io::Result<()> {
    print!("{}> ", cw.view());
    std::io::stdout().flush()
}

fn show(cw: &Clockwork) {
    match cw.view() {
        View::Countdown => {
            let cd = cw.countdown().snapshot();
            let state = if cd.running { "running" } else { "stopped" };
            print!("{} ({state})", cd.display);
            match &cd.label {
                Some(label) => println!(" [{label}]"),
                None => println!(),
            }
            if !cw.labels().list().is_empty() {
                println!("labels: {}", cw.labels().list().join(", "));
            }
        }
        View::Stopwatch => {
            let sw = cw.stopwatch().snapshot();
            let state = if sw.running { "running" } else { "stopped" };
            println!("{} ({state})", sw.display);
            for (i, lap) in sw.laps.iter().enumerate() {
                println!("  lap {:>2}  {}", i + 1, format_stopwatch(*lap as i64));
            }
        }
        View::Alarm => {
            if cw.alarms().is_empty() {
                println!("no alarms");
            }
            for alarm in cw.alarms().list() {
                let mark = if alarm.triggered { "*" } else { " " };
                println!("{mark}{:>14}  {}  {}", alarm.id, alarm.time, alarm.label);
            }
        }
    }
    if cw.is_memory_only() {
        println!("(memory only, changes are not being saved)");
    }
}

/// Turn one input line into an action for the current view.
fn parse_line(view: View, line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let global = match word {
        "" => Some(Input::Empty),
        "help" | "?" => Some(Input::Help),
        "quit" | "exit" => Some(Input::Quit),
        "show" | "status" => Some(Input::Show),
        "json" => Some(Input::Json),
        "view" => {
            let view = rest.parse::<View>().map_err(|e| e.to_string())?;
            Some(Input::Run(Command::SetView { view }))
        }
        "theme" => Some(Input::Run(match rest {
            "" | "toggle" => Command::ToggleTheme,
            other => Command::SetTheme {
                theme: other.parse::<Theme>().map_err(|e| e.to_string())?,
            },
        })),
        _ => None,
    };
    if let Some(input) = global {
        return Ok(input);
    }

    let command = match (view, word) {
        (View::Countdown, "start") => Command::StartCountdown,
        (View::Countdown, "stop") => Command::StopCountdown,
        (View::Countdown, "reset") => Command::ResetCountdown,
        (View::Countdown, "set") => Command::SetCountdownDuration {
            seconds: rest
                .parse()
                .map_err(|_| format!("not a number of seconds: '{rest}'"))?,
        },
        (View::Countdown, "label") => Command::SelectLabel {
            name: match rest {
                "" | "none" => None,
                name => Some(name.to_string()),
            },
        },
        (View::Countdown, "labels") => parse_labels(rest)?,
        (View::Stopwatch, "start") => Command::StartStopwatch,
        (View::Stopwatch, "stop") => Command::StopStopwatch,
        (View::Stopwatch, "reset") => Command::ResetStopwatch,
        (View::Stopwatch, "lap") => Command::AddLap,
        (View::Alarm, "add") => {
            let (time, label) = split_first(rest);
            Command::AddAlarm {
                time: time.to_string(),
                label: label.to_string(),
            }
        }
        (View::Alarm, "edit") => {
            let (id, rest) = split_first(rest);
            let (time, label) = split_first(rest);
            Command::EditAlarm {
                id: parse_id(id)?,
                time: time.to_string(),
                label: label.to_string(),
            }
        }
        (View::Alarm, "delete") => Command::DeleteAlarm {
            id: parse_id(rest)?,
        },
        (View::Alarm, "clear") => Command::ClearAllAlarms {
            confirmed: rest == "yes",
        },
        _ => return Err(format!("unknown command '{word}' in {view} view, try `help`")),
    };
    Ok(Input::Run(command))
}

fn parse_labels(rest: &str) -> Result<Command, String> {
    let (action, args) = split_first(rest);
    match action {
        "add" => Ok(Command::AddLabel {
            name: args.to_string(),
        }),
        "delete" => Ok(Command::DeleteLabel {
            name: args.to_string(),
        }),
        "rename" => {
            let (from, to) = split_first(args);
            Ok(Command::RenameLabel {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
        _ => Err("usage: labels add|rename|delete ...".to_string()),
    }
}

fn split_first(s: &str) -> (&str, &str) {
    match s.trim().split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (s.trim(), ""),
    }
}

fn parse_id(s: &str) -> Result<AlarmId, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("not an alarm id: '{}'", s.trim()))
}
