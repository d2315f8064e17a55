use clap::Subcommand;
use clockwork_core::Theme;

use crate::app::{self, CliResult};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Get,
    /// Set the theme
    Set {
        /// light or dark
        theme: String,
    },
    /// Switch between light and dark
    Toggle,
}

pub fn run(action: ThemeAction) -> CliResult {
    let (_, mut cw) = app::open_default();
    match action {
        ThemeAction::Get => println!("{}", cw.theme()),
        ThemeAction::Set { theme } => {
            let theme: Theme = theme.parse()?;
            cw.set_theme(theme);
            println!("{theme}");
        }
        ThemeAction::Toggle => println!("{}", cw.toggle_theme()),
    }
    Ok(())
}
