use clap::Args;
use smoketrack_core::{Config, Dashboard, Database, StateStore};
use std::time::Duration;

use super::CmdResult;

#[derive(Args)]
pub struct WatchArgs {
    /// Seconds between refreshes
    #[arg(long, default_value = "1")]
    interval: u64,
    /// Stop after this many refreshes
    #[arg(long)]
    count: Option<u64>,
}

/// Re-read the record and build a dashboard for the current local time.
fn snapshot(db: &Database, config: &Config) -> Result<Dashboard, Box<dyn std::error::Error>> {
    let state = db.load()?;
    Ok(Dashboard::build(&state, &chrono::Local::now(), config))
}

pub fn run(json: bool) -> CmdResult {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let dashboard = snapshot(&db, &config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        println!("{dashboard}");
    }
    Ok(())
}

/// Redraw every `interval` seconds; JSON mode prints one line per refresh.
pub fn watch(args: WatchArgs, json: bool) -> CmdResult {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let interval = Duration::from_secs(args.interval.max(1));

    let mut printed = 0u64;
    loop {
        let dashboard = snapshot(&db, &config)?;
        if json {
            println!("{}", serde_json::to_string(&dashboard)?);
        } else {
            println!("{dashboard}\n");
        }
        printed += 1;
        if args.count.is_some_and(|n| printed >= n) {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}
