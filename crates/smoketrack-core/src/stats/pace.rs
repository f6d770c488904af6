//! Pace statistics: running averages and the targets needed to hit them.
//!
//! All functions return `None` when there is no data or no target, never a
//! division by zero.

use crate::state::StateRecord;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Parts a large wait is split into grow by one for every `TAPER_STEP`
/// multiples of the average gap.
const TAPER_STEP: f64 = 1.5;

/// Average minutes between events: `minutes_sum / count`.
pub fn avg_minutes(state: &StateRecord) -> Option<f64> {
    if state.count == 0 {
        return None;
    }
    Some(state.minutes_sum / state.count as f64)
}

/// Average puffs per event: `puffs_sum / count`.
pub fn avg_puffs(state: &StateRecord) -> Option<f64> {
    if state.count == 0 {
        return None;
    }
    Some(state.puffs_sum / state.count as f64)
}

/// Minutes elapsed since the most recent event.
pub fn minutes_since(state: &StateRecord, now_ms: i64) -> Option<f64> {
    state
        .last_smoke_at
        .map(|last| now_ms.saturating_sub(last) as f64 / MS_PER_MINUTE)
}

/// `target * (count + 1) - minutes_sum`.
///
/// The total gap the next event must close for the running average to land
/// exactly on target. Negative when the target is already beaten.
pub fn required_wait_minutes(state: &StateRecord) -> Option<f64> {
    let target = f64::from(state.target_minutes?);
    Some(target * (state.count as f64 + 1.0) - state.minutes_sum)
}

/// The wait shown to the user: never less than the configured target.
pub fn total_wait_target(state: &StateRecord) -> Option<f64> {
    let target = state.target_minutes.filter(|t| *t > 0)?;
    let strict = required_wait_minutes(state)?;
    Some(f64::from(target).max(strict))
}

/// Minutes still to wait from `now_ms`, floored at zero.
pub fn remaining_wait_now(state: &StateRecord, now_ms: i64) -> Option<f64> {
    let total = total_wait_target(state)?;
    let elapsed = minutes_since(state, now_ms).unwrap_or(0.0).max(0.0);
    Some((total - elapsed).max(0.0))
}

/// `target_puffs * (count + 1) - puffs_sum`.
///
/// Puffs the next event should have to bring the average to target. Zero is
/// a valid target.
pub fn required_next_puffs(state: &StateRecord) -> Option<f64> {
    let target = f64::from(state.target_puffs?);
    Some(target * (state.count as f64 + 1.0) - state.puffs_sum)
}

/// Split a large wait into smaller steps relative to the habit average.
///
/// With `r = wait / average` and `k = floor(r / 1.5)`, returns
/// `wait / max(1, k + 1)`. A non-positive wait or average leaves the wait
/// unchanged.
pub fn taper_wait(wait: f64, average: f64) -> f64 {
    if !(wait > 0.0 && average > 0.0) {
        return wait;
    }
    let steps = ((wait / average) / TAPER_STEP).floor();
    wait / (steps + 1.0).max(1.0)
}
