//! Display snapshot of the tracker.
//!
//! Everything a surface needs to render the tracker, computed in one pass.
//! Numeric fields are kept alongside their formatted text so JSON consumers
//! do not have to re-derive placeholders.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt;

use crate::format::{format_hms, format_number, minutes_to_words, PLACEHOLDER};
use crate::state::StateRecord;
use crate::stats::{self, CycleWindow};
use crate::storage::Config;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub target_minutes: Option<u32>,
    pub target_puffs: Option<u32>,
    pub count: u64,

    pub avg_minutes: Option<f64>,
    pub avg_minutes_text: String,
    pub avg_minutes_words: Option<String>,
    pub avg_puffs: Option<f64>,
    pub avg_puffs_text: String,

    pub minutes_since_last: Option<f64>,
    pub minutes_since_last_text: String,
    pub minutes_since_last_words: Option<String>,

    pub cycle_label: String,
    pub cycle_remaining: String,
    pub cycle_count: usize,

    pub run_active: bool,
    pub run_timer: String,
    pub run_avg_minutes: Option<f64>,
    pub run_avg_text: String,
    pub runs_total: usize,
    pub runs_this_week: usize,
}

impl Dashboard {
    pub fn build<Tz: TimeZone>(state: &StateRecord, now: &DateTime<Tz>, config: &Config) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let now_ms = now.timestamp_millis();
        let locale = config.ui.locale;
        let digits = config.ui.decimals as usize;
        let words = |m: Option<f64>| m.map(|m| minutes_to_words(m, locale));

        let avg_minutes = stats::avg_minutes(state);
        let avg_puffs = stats::avg_puffs(state);
        let since = stats::minutes_since(state, now_ms);
        let cycle = CycleWindow::containing(now, config.stats.cycle_start_hour);
        let run_avg = stats::run_avg_minutes(state);
        let run_elapsed = stats::active_run_elapsed_ms(state, now_ms);

        Self {
            target_minutes: state.target_minutes,
            target_puffs: state.target_puffs,
            count: state.count,

            avg_minutes,
            avg_minutes_text: format_number(avg_minutes, digits),
            avg_minutes_words: words(avg_minutes),
            avg_puffs,
            avg_puffs_text: format_number(avg_puffs, digits),

            minutes_since_last: since,
            minutes_since_last_text: format_number(since, digits),
            minutes_since_last_words: words(since),

            cycle_label: cycle.label(),
            cycle_remaining: format_hms(cycle.remaining_ms(now)),
            cycle_count: cycle.count_events(state),

            run_active: run_elapsed.is_some(),
            run_timer: format_hms(run_elapsed.unwrap_or(0)),
            run_avg_minutes: run_avg,
            run_avg_text: format_number(run_avg, digits),
            runs_total: state.run_log.len(),
            runs_this_week: stats::runs_this_week(state, now),
        }
    }
}

fn or_dash<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Targets:           {} min / {} puffs",
            or_dash(self.target_minutes),
            or_dash(self.target_puffs)
        )?;
        writeln!(f, "Recorded:          {}", self.count)?;
        writeln!(
            f,
            "Avg minutes:       {}{}",
            self.avg_minutes_text,
            self.avg_minutes_words
                .as_ref()
                .map(|w| format!(" ({w})"))
                .unwrap_or_default()
        )?;
        writeln!(f, "Avg puffs:         {}", self.avg_puffs_text)?;
        writeln!(
            f,
            "Since last:        {}{}",
            self.minutes_since_last_text,
            self.minutes_since_last_words
                .as_ref()
                .map(|w| format!(" ({w})"))
                .unwrap_or_default()
        )?;
        writeln!(
            f,
            "Cycle:             {} ({} left, {} recorded)",
            self.cycle_label, self.cycle_remaining, self.cycle_count
        )?;
        writeln!(
            f,
            "Run:               {}{}",
            self.run_timer,
            if self.run_active { " (running)" } else { "" }
        )?;
        write!(
            f,
            "Runs:              avg {} min, {} total, {} this week",
            self.run_avg_text, self.runs_total, self.runs_this_week
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn empty_record_renders_placeholders() {
        let now = Utc.with_ymd_and_hms(2024, 3, 13, 9, 0, 0).unwrap();
        let d = Dashboard::build(&StateRecord::default(), &now, &Config::default());
        assert_eq!(d.count, 0);
        assert_eq!(d.avg_minutes_text, "—");
        assert_eq!(d.avg_puffs_text, "—");
        assert_eq!(d.minutes_since_last_text, "—");
        assert_eq!(d.minutes_since_last_words, None);
        assert_eq!(d.run_timer, "00:00:00");
        assert!(!d.run_active);
        assert_eq!(d.cycle_label, "13/03 08:00 – 14/03 08:00");
        assert_eq!(d.cycle_remaining, "23:00:00");

        let text = d.to_string();
        assert!(text.contains("Targets:           — min / — puffs"));
    }

    #[test]
    fn populated_record() {
        let start = Utc.with_ymd_and_hms(2024, 3, 13, 9, 0, 0).unwrap();
        let t0 = start.timestamp_millis();
        let mut s = StateRecord::default();
        s.set_targets("60", "8").unwrap();
        s.record_smoke(8.0, t0).unwrap();
        s.record_smoke(6.0, t0 + 30 * 60_000).unwrap();
        s.start_run(t0);
        s.stop_run(t0 + 600_000).unwrap();
        s.start_run(t0 + 3_600_000);

        let now = Utc.with_ymd_and_hms(2024, 3, 13, 10, 30, 5).unwrap();
        let d = Dashboard::build(&s, &now, &Config::default());
        assert_eq!(d.count, 2);
        assert_eq!(d.avg_minutes_text, "15.0");
        assert_eq!(d.avg_minutes_words.as_deref(), Some("15 minutes"));
        assert_eq!(d.avg_puffs_text, "7.0");
        assert_eq!(d.minutes_since_last_words.as_deref(), Some("1 hour"));
        assert_eq!(d.cycle_count, 2);
        assert!(d.run_active);
        assert_eq!(d.run_timer, "00:30:05");
        assert_eq!(d.run_avg_minutes, Some(10.0));
        assert_eq!(d.runs_total, 1);
        assert_eq!(d.runs_this_week, 1);
    }
}
