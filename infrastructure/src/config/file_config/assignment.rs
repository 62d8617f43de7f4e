//! Assignment configuration from TOML (`[assignment]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [assignment]
//! per_proposal_cap = 3        # reviewers per proposal, 1 to 3
//! per_reviewer_cap = 3        # assignments per reviewer across all proposals, 1 to 3
//! review_deadline_days = 30   # days from assignment to review deadline
//! ```
//!
//! The caps can be lowered for a smaller council but never raised above 3.

use council_application::config::{
    AssignmentParams, DEFAULT_REVIEW_DEADLINE_DAYS, MAX_REVIEW_DEADLINE_DAYS,
};
use council_domain::eligibility::{DEFAULT_PER_PROPOSAL_CAP, DEFAULT_PER_REVIEWER_CAP};
use council_domain::{AssignmentCaps, ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};

/// Raw assignment configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAssignmentConfig {
    pub per_proposal_cap: u32,
    pub per_reviewer_cap: u32,
    pub review_deadline_days: u32,
}

impl Default for FileAssignmentConfig {
    fn default() -> Self {
        let caps = AssignmentCaps::default();
        Self {
            per_proposal_cap: caps.per_proposal,
            per_reviewer_cap: caps.per_reviewer,
            review_deadline_days: DEFAULT_REVIEW_DEADLINE_DAYS,
        }
    }
}

impl FileAssignmentConfig {
    /// Convert to the parameters the assignment use cases take.
    pub fn to_params(&self) -> AssignmentParams {
        AssignmentParams::default()
            .with_caps(AssignmentCaps::new(
                self.per_proposal_cap,
                self.per_reviewer_cap,
            ))
            .with_review_deadline_days(self.review_deadline_days)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (field, value, limit) in [
            (
                "assignment.per_proposal_cap",
                self.per_proposal_cap,
                DEFAULT_PER_PROPOSAL_CAP,
            ),
            (
                "assignment.per_reviewer_cap",
                self.per_reviewer_cap,
                DEFAULT_PER_REVIEWER_CAP,
            ),
        ] {
            if value == 0 {
                issues.push(ConfigIssue {
                    severity: Severity::Error,
                    code: ConfigIssueCode::ZeroCap {
                        field: field.to_string(),
                    },
                    message: format!("{} is 0, so no reviewer could ever be assigned", field),
                });
            } else if value > limit {
                issues.push(ConfigIssue {
                    severity: Severity::Error,
                    code: ConfigIssueCode::CapAboveLimit {
                        field: field.to_string(),
                        limit,
                    },
                    message: format!("{} is {}, but the council allows at most {}", field, value, limit),
                });
            }
        }

        if self.review_deadline_days == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::ZeroDeadline,
                message: "assignment.review_deadline_days is 0: reviews will be due the day they are assigned"
                    .to_string(),
            });
        } else if self.review_deadline_days > MAX_REVIEW_DEADLINE_DAYS {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::DeadlineTooFar {
                    days: self.review_deadline_days,
                    limit: MAX_REVIEW_DEADLINE_DAYS,
                },
                message: format!(
                    "assignment.review_deadline_days is {}; the longest review period is {} days",
                    self.review_deadline_days, MAX_REVIEW_DEADLINE_DAYS
                ),
            });
        }

        issues
    }
}
