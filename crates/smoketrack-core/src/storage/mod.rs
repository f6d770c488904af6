mod config;
pub mod database;

pub use config::{AdviceConfig, Config, StatsConfig, TrackingConfig, UiConfig};
pub use database::{Database, MemoryStore, StateStore, STATE_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/smoketrack[-dev]/` based on SMOKETRACK_ENV.
///
/// Set SMOKETRACK_ENV=dev to use development data directory.
/// SMOKETRACK_DATA_DIR overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("SMOKETRACK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SMOKETRACK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("smoketrack-dev")
            } else {
                base_dir.join("smoketrack")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
