use clap::Subcommand;
use smoketrack_core::Config;

use super::{open_tracker, print_event, CmdResult};

#[derive(Subcommand)]
pub enum TargetsAction {
    /// Show current targets
    Show,
    /// Set targets; an empty value clears, an omitted one is kept
    Set {
        /// Average minutes between cigarettes (minimum 1)
        #[arg(long)]
        minutes: Option<String>,
        /// Average puffs per cigarette
        #[arg(long)]
        puffs: Option<String>,
    },
    /// Clear both targets
    Clear,
}

fn or_empty(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn run(action: TargetsAction, json: bool) -> CmdResult {
    let config = Config::load_or_default();
    let mut tracker = open_tracker()?;
    let now = chrono::Utc::now();

    match action {
        TargetsAction::Show => {
            let state = tracker.state();
            if json {
                let value = serde_json::json!({
                    "target_minutes": state.target_minutes,
                    "target_puffs": state.target_puffs,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                let show = |v: Option<u32>| v.map_or_else(|| "—".to_string(), |v| v.to_string());
                println!("minutes: {}", show(state.target_minutes));
                println!("puffs:   {}", show(state.target_puffs));
            }
        }
        TargetsAction::Set { minutes, puffs } => {
            let minutes = minutes.unwrap_or_else(|| or_empty(tracker.state().target_minutes));
            let puffs = puffs.unwrap_or_else(|| or_empty(tracker.state().target_puffs));
            let event = tracker.set_targets(&minutes, &puffs, now)?;
            print_event(&event, config.ui.locale, json)?;
        }
        TargetsAction::Clear => {
            let event = tracker.set_targets("", "", now)?;
            print_event(&event, config.ui.locale, json)?;
        }
    }
    Ok(())
}
