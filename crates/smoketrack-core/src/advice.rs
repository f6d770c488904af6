//! The "should I smoke now?" recommendation.

use serde::Serialize;

use crate::format::{minutes_to_words, Locale};
use crate::state::StateRecord;
use crate::stats;
use crate::storage::Config;

/// Recommendation computed from the record at a point in time. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    /// Whole minutes still to wait; `None` without a minutes target.
    pub wait_minutes: Option<u64>,
    pub wait_words: Option<String>,
    /// First step of a split wait, when splitting is enabled and applies.
    pub wait_step_minutes: Option<u64>,
    /// Puffs for the next event; `None` without a puffs target.
    pub next_puffs: Option<u64>,
    pub lines: Vec<String>,
}

impl Advice {
    pub fn build(state: &StateRecord, now_ms: i64, config: &Config) -> Self {
        let locale = config.ui.locale;
        let remaining = stats::remaining_wait_now(state, now_ms);
        let wait_minutes = remaining.map(|m| m.round() as u64);

        let wait_step_minutes = match (remaining, stats::avg_minutes(state)) {
            (Some(wait), Some(avg)) if config.advice.taper_large_waits => {
                let step = stats::taper_wait(wait, avg);
                (step < wait).then(|| step.round() as u64)
            }
            _ => None,
        };

        let next_puffs = stats::required_next_puffs(state).map(|p| p.round().max(0.0) as u64);

        let mut lines = Vec::with_capacity(2);
        lines.push(match (wait_minutes, wait_step_minutes) {
            (None, _) => no_minutes_target(locale).to_string(),
            (Some(total), Some(step)) => wait_in_steps(locale, step, total),
            (Some(total), None) => wait_line(locale, total),
        });
        lines.push(match next_puffs {
            None => no_puffs_target(locale).to_string(),
            Some(p) => puffs_line(locale, p),
        });

        Self {
            wait_minutes,
            wait_words: wait_minutes.map(|m| minutes_to_words(m as f64, locale)),
            wait_step_minutes,
            next_puffs,
            lines,
        }
    }

    pub fn message(&self) -> String {
        self.lines.join("\n")
    }
}

fn no_minutes_target(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "No minutes target set. Set one to get a recommended wait.",
        Locale::He => "לא הוגדר יעד דקות. קבע יעד כדי לקבל זמן המתנה מומלץ.",
    }
}

fn no_puffs_target(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "No puffs target set. Set one to get a recommended puff count.",
        Locale::He => "לא הוגדר יעד שכטות. קבע יעד כדי לקבל שכטות מומלצות.",
    }
}

fn wait_line(locale: Locale, minutes: u64) -> String {
    match locale {
        Locale::En => format!("Recommended wait: ~{minutes} minutes."),
        Locale::He => format!("מומלץ לחכות ~ {minutes} דקות."),
    }
}

fn wait_in_steps(locale: Locale, step: u64, total: u64) -> String {
    match locale {
        Locale::En => format!("Recommended wait: ~{step} minutes for now ({total} minutes in total)."),
        Locale::He => format!("מומלץ לחכות ~ {step} דקות כשלב ראשון (סה\"כ {total} דקות)."),
    }
}

fn puffs_line(locale: Locale, puffs: u64) -> String {
    match locale {
        Locale::En => format!("To get back on target, take about {puffs} puffs next time."),
        Locale::He => format!("כדי להתיישר ליעד השכטות: קח בסיגריה הבאה בערך {puffs} שכטות."),
    }
}
