//! The persisted tracker record.

mod record;
pub mod upgrade;

pub use record::{ResetSummary, RunEntry, SmokeEntry, StateRecord};

/// Schema version written by this build.
///
/// Increment this when adding a step to [`upgrade`].
pub const CURRENT_VERSION: u32 = 3;
