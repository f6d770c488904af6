use smoketrack_core::Config;

use super::{open_tracker, print_event, prompt, CmdResult};

pub fn run(yes: bool, json: bool) -> CmdResult {
    if !yes {
        let answer = prompt("Reset all recorded cigarettes? [y/N]: ")?.unwrap_or_default();
        if !matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes") {
            eprintln!("cancelled");
            return Ok(());
        }
    }

    let config = Config::load_or_default();
    let mut tracker = open_tracker()?;
    let event = tracker.reset(chrono::Utc::now())?;
    print_event(&event, config.ui.locale, json)
}
