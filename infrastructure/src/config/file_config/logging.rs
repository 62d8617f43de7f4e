//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file that receives one line per assignment event
    pub audit_log: Option<PathBuf>,
    /// Diagnostic log file, in addition to stderr
    pub file: Option<PathBuf>,
}
