//! Assignment caps
//!
//! Two limits govern review assignments: how many reviewers one proposal may
//! have, and how many proposals one reviewer may review in total.

use serde::{Deserialize, Serialize};

/// Default maximum number of reviewers per proposal.
pub const DEFAULT_PER_PROPOSAL_CAP: u32 = 3;

/// Default maximum number of assignments per reviewer, across all proposals.
pub const DEFAULT_PER_REVIEWER_CAP: u32 = 3;

/// Assignment limits applied by the eligibility rules and the coordinator.
///
/// # Example
///
/// ```
/// use council_domain::eligibility::AssignmentCaps;
///
/// let caps = AssignmentCaps::default();
/// assert!(caps.reviewer_has_capacity(2));
/// assert!(!caps.reviewer_has_capacity(3));
/// assert_eq!(caps.remaining_for_proposal(1), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentCaps {
    pub per_proposal: u32,
    pub per_reviewer: u32,
}

impl Default for AssignmentCaps {
    fn default() -> Self {
        Self {
            per_proposal: DEFAULT_PER_PROPOSAL_CAP,
            per_reviewer: DEFAULT_PER_REVIEWER_CAP,
        }
    }
}

impl AssignmentCaps {
    pub fn new(per_proposal: u32, per_reviewer: u32) -> Self {
        Self {
            per_proposal,
            per_reviewer,
        }
    }

    /// Whether a proposal with `count` assignments can take no more.
    pub fn proposal_is_full(&self, count: u32) -> bool {
        count >= self.per_proposal
    }

    /// Whether a reviewer holding `count` assignments may take another.
    pub fn reviewer_has_capacity(&self, count: u32) -> bool {
        count < self.per_reviewer
    }

    /// How many more reviewers a proposal with `count` assignments can take.
    pub fn remaining_for_proposal(&self, count: u32) -> u32 {
        self.per_proposal.saturating_sub(count)
    }
}

impl std::fmt::Display for AssignmentCaps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} per proposal, {} per reviewer",
            self.per_proposal, self.per_reviewer
        )
    }
}
