pub mod advise;
pub mod config;
pub mod reset;
pub mod run;
pub mod smoke;
pub mod state;
pub mod status;
pub mod targets;

use smoketrack_core::{Database, Event, Locale, Tracker};
use std::io::{self, BufRead, Write};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn open_tracker() -> Result<Tracker<Database>, Box<dyn std::error::Error>> {
    Ok(Tracker::open(Database::open()?)?)
}

/// Print an action's outcome as its message or as JSON.
pub fn print_event(event: &Event, locale: Locale, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(event)?);
    } else {
        println!("{}", event.message(locale));
    }
    Ok(())
}

/// Ask a question on stderr and read one line from stdin.
///
/// Returns `None` on end of input.
pub fn prompt(question: &str) -> io::Result<Option<String>> {
    eprint!("{question}");
    io::stderr().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
