use smoketrack_core::{Advice, Config};

use super::{open_tracker, CmdResult};

pub fn run(json: bool) -> CmdResult {
    let config = Config::load_or_default();
    let tracker = open_tracker()?;
    let advice = Advice::build(tracker.state(), chrono::Utc::now().timestamp_millis(), &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&advice)?);
    } else {
        println!("{}", advice.message());
    }
    Ok(())
}
