use clap::Subcommand;

use crate::app::{self, CliResult};

#[derive(Subcommand)]
pub enum LabelAction {
    /// Save a timer label
    Add { name: String },
    /// Rename a saved label
    Rename { from: String, to: String },
    /// Delete a saved label
    Delete { name: String },
    /// List saved labels
    List {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: LabelAction) -> CliResult {
    let (_, mut cw) = app::open_default();
    match action {
        LabelAction::Add { name } => {
            let saved = cw.add_label(&name)?;
            println!("label added: {saved}");
        }
        LabelAction::Rename { from, to } => {
            if !cw.rename_label(&from, &to)? {
                return Err(format!("no label named '{from}'").into());
            }
            println!("label renamed: {from} -> {}", to.trim());
        }
        LabelAction::Delete { name } => {
            if !cw.delete_label(&name) {
                return Err(format!("no label named '{name}'").into());
            }
            println!("label deleted: {name}");
        }
        LabelAction::List { json } => {
            if json {
                return app::print_json(cw.labels().list());
            }
            for label in cw.labels().list() {
                println!("{label}");
            }
        }
    }
    Ok(())
}
