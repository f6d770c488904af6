//! The persisted tracker record and its mutation contract.
//!
//! Every user action maps to exactly one method here. Methods take the
//! current time explicitly so that callers (and tests) control the clock.

use serde::{Deserialize, Serialize};

use super::CURRENT_VERSION;
use crate::error::ValidationError;

const MS_PER_MINUTE: f64 = 60_000.0;

/// One recorded smoking event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmokeEntry {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Number of puffs.
    pub intensity: u32,
    /// Synthesized while upgrading a legacy record that had no event log.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub backfilled: bool,
}

/// One completed activity run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEntry {
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub duration_ms: i64,
}

impl RunEntry {
    pub fn duration_minutes(&self) -> f64 {
        self.duration_ms as f64 / MS_PER_MINUTE
    }
}

/// The single persisted tracker record.
///
/// Loaded once, mutated in memory by an action, then saved wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    #[serde(default)]
    pub version: u32,
    /// Desired average minutes between events (at least 1).
    #[serde(default)]
    pub target_minutes: Option<u32>,
    /// Desired average puffs per event (zero is a valid target).
    #[serde(default)]
    pub target_puffs: Option<u32>,
    #[serde(default)]
    pub count: u64,
    /// Sum of inter-event gaps in minutes. The first event never contributes.
    #[serde(default)]
    pub minutes_sum: f64,
    #[serde(default)]
    pub puffs_sum: f64,
    #[serde(default)]
    pub last_smoke_at: Option<i64>,
    #[serde(default)]
    pub smoke_log: Vec<SmokeEntry>,
    #[serde(default)]
    pub run_log: Vec<RunEntry>,
    #[serde(default)]
    pub current_run_start_ms: Option<i64>,
}

impl Default for StateRecord {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            target_minutes: None,
            target_puffs: None,
            count: 0,
            minutes_sum: 0.0,
            puffs_sum: 0.0,
            last_smoke_at: None,
            smoke_log: Vec::new(),
            run_log: Vec::new(),
            current_run_start_ms: None,
        }
    }
}

/// Outcome of [`StateRecord::reset`].
///
/// Targets and run data always survive; only the smoking aggregates and the
/// smoking log are cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    pub cleared_events: usize,
    pub kept_runs: usize,
    pub kept_targets: bool,
}

impl StateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_active_run(&self) -> bool {
        self.current_run_start_ms.is_some()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record a smoking event with the given puff count at `now_ms`.
    ///
    /// Rejects negative and non-finite counts; fractional counts are rounded.
    /// The elapsed gap since the previous event is added to `minutes_sum` only
    /// when it is finite and non-negative.
    pub fn record_smoke(&mut self, intensity: f64, now_ms: i64) -> Result<SmokeEntry, ValidationError> {
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(ValidationError::InvalidIntensity(intensity.to_string()));
        }
        let puffs = intensity.round() as u32;

        if self.count == 0 {
            self.count = 1;
        } else {
            if let Some(last) = self.last_smoke_at {
                let delta_min = now_ms.saturating_sub(last) as f64 / MS_PER_MINUTE;
                if delta_min.is_finite() && delta_min >= 0.0 {
                    self.minutes_sum += delta_min;
                } else {
                    tracing::debug!(delta_min, "dropping negative gap since last event");
                }
            }
            self.count += 1;
        }
        self.puffs_sum += f64::from(puffs);
        self.last_smoke_at = Some(now_ms);

        let entry = SmokeEntry {
            timestamp: now_ms,
            intensity: puffs,
            backfilled: false,
        };
        self.smoke_log.push(entry.clone());
        Ok(entry)
    }

    /// Start an activity run. Returns `false` when one is already active.
    pub fn start_run(&mut self, now_ms: i64) -> bool {
        if self.current_run_start_ms.is_some() {
            return false;
        }
        self.current_run_start_ms = Some(now_ms);
        true
    }

    /// Stop the active run and append it to the run log.
    pub fn stop_run(&mut self, now_ms: i64) -> Result<RunEntry, ValidationError> {
        let start = self.current_run_start_ms.ok_or(ValidationError::NoActiveRun)?;
        let entry = RunEntry {
            start_timestamp: start,
            end_timestamp: now_ms,
            duration_ms: now_ms.saturating_sub(start).max(0),
        };
        self.run_log.push(entry.clone());
        self.current_run_start_ms = None;
        Ok(entry)
    }

    /// Replace both targets from raw text inputs.
    ///
    /// An empty input clears the target. Minutes floor at 1, puffs at 0, both
    /// rounded to the nearest integer. Nothing changes if either input fails
    /// to parse.
    pub fn set_targets(&mut self, minutes: &str, puffs: &str) -> Result<(), ValidationError> {
        let target_minutes = parse_target("minutes", minutes, 1)?;
        let target_puffs = parse_target("puffs", puffs, 0)?;
        self.target_minutes = target_minutes;
        self.target_puffs = target_puffs;
        Ok(())
    }

    /// Zero the smoking aggregates and clear the smoking log.
    pub fn reset(&mut self) -> ResetSummary {
        let summary = ResetSummary {
            cleared_events: self.smoke_log.len(),
            kept_runs: self.run_log.len(),
            kept_targets: self.target_minutes.is_some() || self.target_puffs.is_some(),
        };
        *self = Self {
            target_minutes: self.target_minutes,
            target_puffs: self.target_puffs,
            run_log: std::mem::take(&mut self.run_log),
            current_run_start_ms: self.current_run_start_ms,
            ..Self::default()
        };
        summary
    }
}

fn parse_target(field: &str, raw: &str, floor: u32) -> Result<Option<u32>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let invalid = || ValidationError::InvalidTarget {
        field: field.to_string(),
        input: raw.to_string(),
    };
    let value: f64 = raw.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    let rounded = value.round().max(f64::from(floor));
    Ok(Some(rounded.min(f64::from(u32::MAX)) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: i64 = 60_000;

    #[test]
    fn first_event_does_not_contribute_minutes() {
        let mut s = StateRecord::new();
        s.record_smoke(8.0, 1_000).unwrap();
        assert_eq!(s.count, 1);
        assert_eq!(s.minutes_sum, 0.0);
        assert_eq!(s.puffs_sum, 8.0);
        assert_eq!(s.last_smoke_at, Some(1_000));
        assert_eq!(s.smoke_log.len(), 1);
    }

    #[test]
    fn second_event_adds_gap() {
        let mut s = StateRecord::new();
        s.record_smoke(8.0, 0).unwrap();
        s.record_smoke(6.0, 30 * MIN).unwrap();
        assert_eq!(s.count, 2);
        assert!((s.minutes_sum - 30.0).abs() < 1e-9);
        assert_eq!(s.puffs_sum, 14.0);
    }

    #[test]
    fn negative_gap_is_dropped_not_subtracted() {
        let mut s = StateRecord::new();
        s.record_smoke(5.0, 10 * MIN).unwrap();
        s.record_smoke(5.0, 0).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.minutes_sum, 0.0);
        assert_eq!(s.last_smoke_at, Some(0));
    }

    #[test]
    fn intensity_is_validated_and_rounded() {
        let mut s = StateRecord::new();
        assert!(matches!(
            s.record_smoke(-1.0, 0),
            Err(ValidationError::InvalidIntensity(_))
        ));
        assert!(s.record_smoke(f64::NAN, 0).is_err());
        assert!(s.record_smoke(f64::INFINITY, 0).is_err());
        assert_eq!(s.count, 0);
        assert!(s.smoke_log.is_empty());

        let entry = s.record_smoke(7.6, 0).unwrap();
        assert_eq!(entry.intensity, 8);
    }

    #[test]
    fn run_lifecycle() {
        let mut s = StateRecord::new();
        assert!(s.start_run(0));
        assert!(!s.start_run(5_000));
        assert_eq!(s.current_run_start_ms, Some(0));

        let run = s.stop_run(600_000).unwrap();
        assert_eq!(run.duration_ms, 600_000);
        assert_eq!(run.duration_minutes(), 10.0);
        assert!(!s.has_active_run());
        assert_eq!(s.stop_run(700_000), Err(ValidationError::NoActiveRun));
        assert_eq!(s.run_log.len(), 1);
    }

    #[test]
    fn stop_before_start_clamps_duration() {
        let mut s = StateRecord::new();
        s.start_run(10_000);
        assert_eq!(s.stop_run(5_000).unwrap().duration_ms, 0);
    }

    #[test]
    fn extreme_timestamps_saturate() {
        let mut s = StateRecord::new();
        s.record_smoke(1.0, i64::MIN).unwrap();
        s.record_smoke(1.0, i64::MAX).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.minutes_sum, i64::MAX as f64 / 60_000.0);

        s.start_run(i64::MIN);
        assert_eq!(s.stop_run(i64::MAX).unwrap().duration_ms, i64::MAX);
    }

    #[test]
    fn targets_parse_round_and_floor() {
        let mut s = StateRecord::new();
        s.set_targets(" 59.6 ", "7.4").unwrap();
        assert_eq!(s.target_minutes, Some(60));
        assert_eq!(s.target_puffs, Some(7));

        s.set_targets("0", "-3").unwrap();
        assert_eq!(s.target_minutes, Some(1));
        assert_eq!(s.target_puffs, Some(0));

        s.set_targets("", "  ").unwrap();
        assert_eq!(s.target_minutes, None);
        assert_eq!(s.target_puffs, None);
    }

    #[test]
    fn invalid_target_leaves_record_untouched() {
        let mut s = StateRecord::new();
        s.set_targets("45", "6").unwrap();
        let err = s.set_targets("30", "lots").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTarget { .. }));
        assert_eq!(s.target_minutes, Some(45));
        assert_eq!(s.target_puffs, Some(6));
        assert!(s.set_targets("inf", "").is_err());
    }

    #[test]
    fn reset_keeps_targets_and_runs() {
        let mut s = StateRecord::new();
        s.set_targets("60", "8").unwrap();
        s.record_smoke(8.0, 0).unwrap();
        s.record_smoke(8.0, 30 * MIN).unwrap();
        s.start_run(0);
        s.stop_run(MIN).unwrap();
        s.start_run(2 * MIN);

        let summary = s.reset();
        assert_eq!(summary.cleared_events, 2);
        assert_eq!(summary.kept_runs, 1);
        assert!(summary.kept_targets);

        assert_eq!(s.count, 0);
        assert_eq!(s.minutes_sum, 0.0);
        assert_eq!(s.puffs_sum, 0.0);
        assert_eq!(s.last_smoke_at, None);
        assert!(s.smoke_log.is_empty());
        assert_eq!(s.target_minutes, Some(60));
        assert_eq!(s.run_log.len(), 1);
        assert_eq!(s.current_run_start_ms, Some(2 * MIN));
        assert_eq!(s.version, CURRENT_VERSION);
    }
}
