//! Database configuration from TOML (`[database]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Database file used when nothing else is configured.
pub const DEFAULT_DATABASE_PATH: &str = "council.db";

/// Raw database configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDatabaseConfig {
    /// Path to the SQLite file, created on first use
    pub path: PathBuf,
}

impl Default for FileDatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}
