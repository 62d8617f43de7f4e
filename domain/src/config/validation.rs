//! Configuration validation issues.
//!
//! Config loaders report problems as a list of [`ConfigIssue`]s instead of
//! failing on the first one, so the binary can print every warning and stop
//! only on errors.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A cap of zero makes every assignment impossible.
    ZeroCap { field: String },
    /// A cap above the council's fixed limit.
    CapAboveLimit { field: String, limit: u32 },
    /// A required path is empty.
    EmptyPath { field: String },
    /// A review deadline on the day of assignment.
    ZeroDeadline,
    /// A review period longer than any deadline the store accepts.
    DeadlineTooFar { days: u32, limit: u32 },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    /// Whether any of `issues` is an error.
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}
