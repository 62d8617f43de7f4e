//! Raw TOML configuration data types
//!
//! These structs mirror the config file section by section. They are
//! deserialized directly and converted to application types once loaded.

mod assignment;
mod database;
mod logging;
mod output;

pub use assignment::FileAssignmentConfig;
pub use database::{DEFAULT_DATABASE_PATH, FileDatabaseConfig};
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};

use council_domain::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Where the council database lives
    pub database: FileDatabaseConfig,
    /// Caps and deadlines for review assignments
    pub assignment: FileAssignmentConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Audit and diagnostic log files
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks:
    /// 1. The database path is not empty
    /// 2. Neither assignment cap is zero
    /// 3. The review deadline is at least one day out
    /// 4. Log paths, when given, are not empty
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.database.path.as_os_str().is_empty() {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::EmptyPath {
                    field: "database.path".to_string(),
                },
                message: "database.path must not be empty".to_string(),
            });
        }

        issues.extend(self.assignment.validate());

        for (field, path) in [
            ("logging.audit_log", &self.logging.audit_log),
            ("logging.file", &self.logging.file),
        ] {
            if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                issues.push(ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::EmptyPath {
                        field: field.to_string(),
                    },
                    message: format!("{} is empty and will be ignored", field),
                });
            }
        }

        issues
    }
}
