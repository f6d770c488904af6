//! Activity run statistics.

use chrono::{DateTime, Datelike, Duration, TimeZone};

use super::cycle::at_local;
use crate::state::StateRecord;

/// Mean run length in minutes, `None` with no completed runs.
pub fn run_avg_minutes(state: &StateRecord) -> Option<f64> {
    if state.run_log.is_empty() {
        return None;
    }
    let total: f64 = state.run_log.iter().map(|r| r.duration_minutes()).sum();
    Some(total / state.run_log.len() as f64)
}

/// Most recent Sunday 00:00 at or before `now`.
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let days_back = i64::from(now.weekday().num_days_from_sunday());
    let sunday = now.date_naive() - Duration::days(days_back);
    at_local(&now.timezone(), sunday, 0)
}

/// Completed runs that started this week.
pub fn runs_this_week<Tz: TimeZone>(state: &StateRecord, now: &DateTime<Tz>) -> usize {
    let since = week_start(now).timestamp_millis();
    state
        .run_log
        .iter()
        .filter(|r| r.start_timestamp >= since)
        .count()
}

/// Elapsed time of the active run, if any.
pub fn active_run_elapsed_ms(state: &StateRecord, now_ms: i64) -> Option<i64> {
    state
        .current_run_start_ms
        .map(|start| now_ms.saturating_sub(start).max(0))
}
