use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::{minutes_to_words, Locale};

/// Every state change in the tracker produces an Event.
/// Surfaces render them; the CLI prints them as JSON on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SmokeRecorded {
        intensity: u32,
        count: u64,
        /// Gap since the previous event, when there was one.
        gap_minutes: Option<f64>,
        at: DateTime<Utc>,
    },
    TargetsSaved {
        target_minutes: Option<u32>,
        target_puffs: Option<u32>,
        at: DateTime<Utc>,
    },
    RunStarted {
        at: DateTime<Utc>,
    },
    /// Start requested while a run was already active; nothing changed.
    RunAlreadyActive {
        since: DateTime<Utc>,
    },
    RunStopped {
        started_at: DateTime<Utc>,
        duration_ms: i64,
        at: DateTime<Utc>,
    },
    StateReset {
        cleared_events: usize,
        kept_runs: usize,
        kept_targets: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// One-line status message for the user.
    pub fn message(&self, locale: Locale) -> String {
        match (self, locale) {
            (Event::SmokeRecorded { .. }, Locale::En) => "Recorded. Nice work keeping track.".into(),
            (Event::SmokeRecorded { .. }, Locale::He) => "עודכנו הנתונים. כל הכבוד על המעקב.".into(),
            (Event::TargetsSaved { .. }, Locale::En) => "Targets saved.".into(),
            (Event::TargetsSaved { .. }, Locale::He) => "היעדים נשמרו.".into(),
            (Event::RunStarted { .. }, Locale::En) => "Run started.".into(),
            (Event::RunStarted { .. }, Locale::He) => "הריצה התחילה.".into(),
            (Event::RunAlreadyActive { .. }, Locale::En) => "A run is already in progress.".into(),
            (Event::RunAlreadyActive { .. }, Locale::He) => "ריצה כבר פעילה.".into(),
            (Event::RunStopped { duration_ms, .. }, locale) => {
                let words = minutes_to_words(*duration_ms as f64 / 60_000.0, locale);
                match locale {
                    Locale::En => format!("Run stopped after {words}."),
                    Locale::He => format!("הריצה הסתיימה אחרי {words}."),
                }
            }
            (Event::StateReset { kept_targets, .. }, Locale::En) => {
                if *kept_targets {
                    "Data cleared. Targets kept.".into()
                } else {
                    "Data cleared.".into()
                }
            }
            (Event::StateReset { kept_targets, .. }, Locale::He) => {
                if *kept_targets {
                    "נמחקו הנתונים. היעדים נשארו.".into()
                } else {
                    "נמחקו הנתונים.".into()
                }
            }
        }
    }
}

/// Milliseconds since the epoch as a UTC timestamp.
pub(crate) fn utc_from_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
