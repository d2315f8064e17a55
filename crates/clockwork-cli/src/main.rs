use clap::{Parser, Subcommand};
use clockwork_core::View;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod player;
mod shell;

#[derive(Parser)]
#[command(name = "clockwork", version, about = "Countdown timer, stopwatch and alarm clock")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Countdown timer
    Countdown {
        #[command(subcommand)]
        action: commands::countdown::CountdownAction,
    },
    /// Stopwatch with laps
    ///
    /// One-shot `start`, `lap` and `stop` act on the saved state only. Time
    /// between separate invocations is not counted, because nothing samples
    /// the stopwatch while no clockwork process runs. Use `stopwatch watch`
    /// or `clockwork shell` for live timing.
    Stopwatch {
        #[command(subcommand)]
        action: commands::stopwatch::StopwatchAction,
    },
    /// Alarm management
    Alarm {
        #[command(subcommand)]
        action: commands::alarm::AlarmAction,
    },
    /// Saved countdown labels
    Label {
        #[command(subcommand)]
        action: commands::label::LabelAction,
    },
    /// Light/dark theme preference
    Theme {
        #[command(subcommand)]
        action: commands::theme::ThemeAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Interactive session over all three tools
    Shell {
        /// View to start in
        #[arg(long, default_value = "countdown")]
        view: View,
    },
    /// Print shell completions
    Completions { shell: clap_complete::Shell },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Countdown { action } => commands::countdown::run(action),
        Commands::Stopwatch { action } => commands::stopwatch::run(action),
        Commands::Alarm { action } => commands::alarm::run(action),
        Commands::Label { action } => commands::label::run(action),
        Commands::Theme { action } => commands::theme::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Shell { view } => shell::run(view),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
