//! Action handlers.
//!
//! A [`Tracker`] owns the record and the store it came from. Each action
//! mutates a copy of the record, saves it wholesale, and reports what
//! happened as an [`Event`]. The copy replaces the in-memory record only
//! after the save succeeds. Rejected actions change nothing and save nothing.

use chrono::{DateTime, Utc};

use crate::error::{Result, ValidationError};
use crate::events::{utc_from_ms, Event};
use crate::state::StateRecord;
use crate::stats;
use crate::storage::StateStore;

pub struct Tracker<S: StateStore> {
    store: S,
    state: StateRecord,
}

impl<S: StateStore> Tracker<S> {
    /// Load the record from `store`.
    ///
    /// # Errors
    /// Returns an error only if the store itself is unreachable; an unreadable
    /// record loads as the default.
    pub fn open(store: S) -> Result<Self> {
        let state = store.load()?;
        tracing::debug!(count = state.count, runs = state.run_log.len(), "loaded tracker record");
        Ok(Self { store, state })
    }

    pub fn state(&self) -> &StateRecord {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn commit<T>(
        &mut self,
        action: impl FnOnce(&mut StateRecord) -> Result<T, ValidationError>,
    ) -> Result<T> {
        let mut next = self.state.clone();
        let out = action(&mut next)?;
        self.store.save(&next)?;
        self.state = next;
        Ok(out)
    }

    /// Record a smoking event with `intensity` puffs.
    pub fn record_smoke(&mut self, intensity: f64, at: DateTime<Utc>) -> Result<Event> {
        let now_ms = at.timestamp_millis();
        let gap_minutes = if self.state.count > 0 {
            stats::minutes_since(&self.state, now_ms).filter(|m| *m >= 0.0)
        } else {
            None
        };
        let entry = self.commit(|s| s.record_smoke(intensity, now_ms))?;
        tracing::debug!(intensity = entry.intensity, count = self.state.count, "recorded event");
        Ok(Event::SmokeRecorded {
            intensity: entry.intensity,
            count: self.state.count,
            gap_minutes,
            at,
        })
    }

    /// Replace both targets from raw inputs; empty input clears a target.
    pub fn set_targets(&mut self, minutes: &str, puffs: &str, at: DateTime<Utc>) -> Result<Event> {
        self.commit(|s| s.set_targets(minutes, puffs))?;
        tracing::debug!(
            target_minutes = ?self.state.target_minutes,
            target_puffs = ?self.state.target_puffs,
            "saved targets"
        );
        Ok(Event::TargetsSaved {
            target_minutes: self.state.target_minutes,
            target_puffs: self.state.target_puffs,
            at,
        })
    }

    /// Start a run. Starting while one is active changes nothing.
    pub fn start_run(&mut self, at: DateTime<Utc>) -> Result<Event> {
        if let Some(start) = self.state.current_run_start_ms {
            return Ok(Event::RunAlreadyActive {
                since: utc_from_ms(start),
            });
        }
        self.commit(|s| Ok(s.start_run(at.timestamp_millis())))?;
        tracing::debug!("run started");
        Ok(Event::RunStarted { at })
    }

    /// Stop the active run.
    ///
    /// # Errors
    /// Returns [`ValidationError::NoActiveRun`](crate::ValidationError::NoActiveRun)
    /// when no run is active.
    pub fn stop_run(&mut self, at: DateTime<Utc>) -> Result<Event> {
        let run = self.commit(|s| s.stop_run(at.timestamp_millis()))?;
        tracing::debug!(duration_ms = run.duration_ms, "run stopped");
        Ok(Event::RunStopped {
            started_at: utc_from_ms(run.start_timestamp),
            duration_ms: run.duration_ms,
            at,
        })
    }

    /// Clear smoking aggregates and the smoking log. Targets and runs stay.
    pub fn reset(&mut self, at: DateTime<Utc>) -> Result<Event> {
        let summary = self.commit(|s| Ok(s.reset()))?;
        tracing::debug!(cleared = summary.cleared_events, "record reset");
        Ok(Event::StateReset {
            cleared_events: summary.cleared_events,
            kept_runs: summary.kept_runs,
            kept_targets: summary.kept_targets,
            at,
        })
    }

    /// Replace the whole record, e.g. from an import.
    pub fn replace(&mut self, state: StateRecord) -> Result<()> {
        self.store.save(&state)?;
        self.state = state;
        Ok(())
    }
}
