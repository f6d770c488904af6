//! Fixed daily reporting window.
//!
//! A cycle runs from `start_hour` (08:00 by default) to the same hour on the
//! following day, in whatever time zone the reference time carries.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::state::StateRecord;

pub const DEFAULT_CYCLE_START_HOUR: u32 = 8;

/// One cycle, `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleWindow<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> CycleWindow<Tz> {
    /// The cycle containing `now`.
    pub fn containing(now: &DateTime<Tz>, start_hour: u32) -> Self {
        let start = cycle_start(now, start_hour);
        let end = start.clone() + Duration::hours(24);
        Self { start, end }
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }

    /// Milliseconds until the cycle ends, floored at zero.
    pub fn remaining_ms(&self, now: &DateTime<Tz>) -> i64 {
        self.end_ms().saturating_sub(now.timestamp_millis()).max(0)
    }

    /// `DD/MM HH:MM – DD/MM HH:MM`
    pub fn label(&self) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!(
            "{} – {}",
            self.start.format("%d/%m %H:%M"),
            self.end.format("%d/%m %H:%M")
        )
    }

    /// Number of logged events inside this cycle.
    pub fn count_events(&self, state: &StateRecord) -> usize {
        count_events_in_window(state, self.start_ms(), self.end_ms())
    }
}

/// Today's `start_hour` if `now` is at or past it, otherwise yesterday's.
pub fn cycle_start<Tz: TimeZone>(now: &DateTime<Tz>, start_hour: u32) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    let today_start = at_local(&tz, today, start_hour);
    if *now >= today_start {
        return today_start;
    }
    let yesterday = today.pred_opt().unwrap_or(today);
    at_local(&tz, yesterday, start_hour)
}

/// Count recorded events with `start_ms <= timestamp < end_ms`.
///
/// Entries synthesized while upgrading a legacy record carry estimated
/// timestamps and are not counted.
pub fn count_events_in_window(state: &StateRecord, start_ms: i64, end_ms: i64) -> usize {
    state
        .smoke_log
        .iter()
        .filter(|e| !e.backfilled && e.timestamp >= start_ms && e.timestamp < end_ms)
        .count()
}

/// The instant `date hour:00` in `tz`.
///
/// Ambiguous local times resolve to the earliest instant; a time skipped by a
/// DST jump resolves to one hour later.
pub(crate) fn at_local<Tz: TimeZone>(tz: &Tz, date: NaiveDate, hour: u32) -> DateTime<Tz> {
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or_default();
    let naive = NaiveDateTime::new(date, time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
