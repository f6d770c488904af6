use clap::Subcommand;
use smoketrack_core::state::upgrade;
use std::path::PathBuf;

use super::{open_tracker, CmdResult};

#[derive(Subcommand)]
pub enum StateAction {
    /// Print the tracker record as JSON
    Export,
    /// Replace the tracker record with a JSON export (older formats are upgraded)
    Import {
        /// Path to the exported JSON document
        file: PathBuf,
    },
}

pub fn run(action: StateAction) -> CmdResult {
    let mut tracker = open_tracker()?;

    match action {
        StateAction::Export => {
            println!("{}", serde_json::to_string_pretty(tracker.state())?);
        }
        StateAction::Import { file } => {
            let content = std::fs::read_to_string(&file)?;
            let raw: serde_json::Value = serde_json::from_str(&content)?;
            let state = upgrade::upgrade(raw)?;
            let count = state.count;
            let runs = state.run_log.len();
            tracker.replace(state)?;
            tracing::info!(file = %file.display(), count, runs, "imported tracker record");
            println!("imported {count} cigarettes and {runs} runs");
        }
    }
    Ok(())
}
