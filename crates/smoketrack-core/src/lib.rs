//! # smoketrack Core Library
//!
//! This library provides the core logic for smoketrack, a personal pace
//! tracker for smoking events and activity runs. Every operation is available
//! through the standalone CLI; any other surface is a thin layer over the
//! same core.
//!
//! ## Architecture
//!
//! - **State**: a single owned record (targets, running sums, event and run
//!   logs) with a schema-versioned upgrade applied at load time
//! - **Statistics**: pure functions over the record; the caller supplies the
//!   reference time
//! - **Storage**: SQLite key-value persistence and TOML configuration
//! - **Tracker**: action handlers that mutate, save, and emit events
//!
//! ## Key Components
//!
//! - [`StateRecord`]: The persisted record and its mutation contract
//! - [`Tracker`]: Action handlers over a [`StateStore`]
//! - [`Dashboard`]: Display snapshot
//! - [`Advice`]: Wait and puff recommendation
//! - [`Config`]: Application configuration management

pub mod advice;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod format;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use advice::Advice;
pub use dashboard::Dashboard;
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use format::{format_hms, format_number, minutes_to_words, Locale};
pub use state::{RunEntry, SmokeEntry, StateRecord, CURRENT_VERSION};
pub use stats::CycleWindow;
pub use storage::{Config, Database, MemoryStore, StateStore};
pub use tracker::Tracker;
