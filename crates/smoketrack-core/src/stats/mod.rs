//! Statistics engine.
//!
//! Pure functions over a [`StateRecord`](crate::state::StateRecord). No I/O,
//! no clock access: the caller passes the reference time.

mod cycle;
mod pace;
mod runs;

pub use cycle::{count_events_in_window, cycle_start, CycleWindow, DEFAULT_CYCLE_START_HOUR};
pub use pace::{
    avg_minutes, avg_puffs, minutes_since, remaining_wait_now, required_next_puffs,
    required_wait_minutes, taper_wait, total_wait_target,
};
pub use runs::{active_run_elapsed_ms, run_avg_minutes, runs_this_week, week_start};
