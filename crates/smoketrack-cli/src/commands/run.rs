use clap::Subcommand;
use smoketrack_core::stats;
use smoketrack_core::{format_hms, format_number, Config};

use super::{open_tracker, print_event, CmdResult};

#[derive(Subcommand)]
pub enum RunAction {
    /// Start a run
    Start,
    /// Stop the active run
    Stop,
    /// Show the active run and run totals
    Status,
}

pub fn run(action: RunAction, json: bool) -> CmdResult {
    let config = Config::load_or_default();
    let mut tracker = open_tracker()?;
    let now = chrono::Utc::now();

    match action {
        RunAction::Start => {
            let event = tracker.start_run(now)?;
            print_event(&event, config.ui.locale, json)?;
        }
        RunAction::Stop => {
            let event = tracker.stop_run(now)?;
            print_event(&event, config.ui.locale, json)?;
        }
        RunAction::Status => {
            let state = tracker.state();
            let local_now = chrono::Local::now();
            let elapsed = stats::active_run_elapsed_ms(state, now.timestamp_millis());
            let avg = stats::run_avg_minutes(state);
            let this_week = stats::runs_this_week(state, &local_now);
            if json {
                let value = serde_json::json!({
                    "active": elapsed.is_some(),
                    "elapsed_ms": elapsed,
                    "avg_minutes": avg,
                    "total": state.run_log.len(),
                    "this_week": this_week,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                match elapsed {
                    Some(ms) => println!("running: {}", format_hms(ms)),
                    None => println!("no active run"),
                }
                println!(
                    "avg {} min, {} total, {} this week",
                    format_number(avg, config.ui.decimals as usize),
                    state.run_log.len(),
                    this_week
                );
            }
        }
    }
    Ok(())
}
