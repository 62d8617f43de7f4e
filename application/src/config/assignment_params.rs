//! Assignment parameters: limits and defaults applied when writing assignments.

use chrono::{Days, NaiveDate};
use council_domain::AssignmentCaps;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Days between assignment and review deadline, unless configured.
pub const DEFAULT_REVIEW_DEADLINE_DAYS: u32 = 30;

/// Longest review period configuration accepts.
pub const MAX_REVIEW_DEADLINE_DAYS: u32 = 3650;

/// The review deadline falls outside the calendar range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("a review deadline {days} days after {from} is not a valid date")]
pub struct DeadlineOutOfRange {
    pub from: NaiveDate,
    pub days: u32,
}

/// Parameters shared by every use case that writes review assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentParams {
    pub caps: AssignmentCaps,
    /// Days from the assignment date to the review deadline.
    pub review_deadline_days: u32,
}

impl Default for AssignmentParams {
    fn default() -> Self {
        Self {
            caps: AssignmentCaps::default(),
            review_deadline_days: DEFAULT_REVIEW_DEADLINE_DAYS,
        }
    }
}

impl AssignmentParams {
    // ==================== Builder Methods ====================

    pub fn with_caps(mut self, caps: AssignmentCaps) -> Self {
        self.caps = caps;
        self
    }

    pub fn with_review_deadline_days(mut self, days: u32) -> Self {
        self.review_deadline_days = days;
        self
    }

    /// Review deadline for an assignment made on `today`.
    pub fn review_deadline(&self, today: NaiveDate) -> Result<NaiveDate, DeadlineOutOfRange> {
        today
            .checked_add_days(Days::new(u64::from(self.review_deadline_days)))
            .ok_or(DeadlineOutOfRange {
                from: today,
                days: self.review_deadline_days,
            })
    }
}
