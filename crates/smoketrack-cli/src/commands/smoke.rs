use clap::Args;
use smoketrack_core::{Config, ValidationError};

use super::{open_tracker, print_event, prompt, CmdResult};

#[derive(Args)]
pub struct SmokeArgs {
    /// Number of puffs taken
    puffs: Option<f64>,
}

pub fn run(args: SmokeArgs, json: bool) -> CmdResult {
    let config = Config::load_or_default();
    let puffs = match args.puffs {
        Some(p) => p,
        None => {
            let default = config.tracking.default_intensity;
            let Some(answer) = prompt(&format!("How many puffs? [{default}]: "))? else {
                // Cancelled.
                return Ok(());
            };
            if answer.is_empty() {
                f64::from(default)
            } else {
                answer
                    .parse::<f64>()
                    .map_err(|_| ValidationError::InvalidIntensity(answer.clone()))?
            }
        }
    };

    let mut tracker = open_tracker()?;
    let event = tracker.record_smoke(puffs, chrono::Utc::now())?;
    print_event(&event, config.ui.locale, json)
}
