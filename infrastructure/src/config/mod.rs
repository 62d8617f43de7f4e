//! Configuration file loading for grant-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `COUNCIL_*` environment variables (`COUNCIL_DATABASE__PATH=...`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./council.toml` or `./.council.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/grant-council/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    DEFAULT_DATABASE_PATH, FileAssignmentConfig, FileConfig, FileDatabaseConfig,
    FileLoggingConfig, FileOutputConfig, FileOutputFormat,
};
pub use loader::ConfigLoader;
