//! Reviewer eligibility rules
//!
//! A reviewer may be assigned to a proposal only when all three hold:
//!
//! 1. they are not already assigned to it,
//! 2. none of their conflict declarations names the PI or any collaborator,
//! 3. they hold fewer assignments overall than the per-reviewer cap.
//!
//! Checks run in that order and the first failure is reported.

use super::caps::AssignmentCaps;
use super::snapshot::{ProposalParties, ReviewerLoad};
use crate::core::ids::{ProposalId, ResearcherId, ReviewerId};
use serde::{Deserialize, Serialize};

/// Why a reviewer cannot be assigned to a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Ineligibility {
    /// Already reviewing this proposal
    AlreadyAssigned,
    /// Declared a conflict with this researcher, who is the PI or a collaborator
    Conflicted { researcher: ResearcherId },
    /// Holds the maximum number of assignments
    AtCapacity { assignments: u32 },
}

impl std::fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ineligibility::AlreadyAssigned => write!(f, "already assigned to this proposal"),
            Ineligibility::Conflicted { researcher } => {
                write!(f, "conflict of interest with researcher {}", researcher)
            }
            Ineligibility::AtCapacity { assignments } => {
                write!(f, "already holds {} assignments", assignments)
            }
        }
    }
}

/// A reviewer who may be assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleReviewer {
    pub id: ReviewerId,
    pub name: String,
}

/// A reviewer who may not be assigned, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedReviewer {
    pub id: ReviewerId,
    pub name: String,
    pub reason: Ineligibility,
}

/// Result of resolving eligibility for one proposal.
///
/// Both lists are ordered by reviewer id. An empty `eligible` list is a
/// normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub proposal: ProposalId,
    pub eligible: Vec<EligibleReviewer>,
    pub excluded: Vec<ExcludedReviewer>,
}

impl Eligibility {
    pub fn empty(proposal: ProposalId) -> Self {
        Self {
            proposal,
            eligible: Vec::new(),
            excluded: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }

    pub fn len(&self) -> usize {
        self.eligible.len()
    }

    pub fn contains(&self, reviewer: ReviewerId) -> bool {
        self.get(reviewer).is_some()
    }

    pub fn get(&self, reviewer: ReviewerId) -> Option<&EligibleReviewer> {
        self.eligible
            .binary_search_by_key(&reviewer, |r| r.id)
            .ok()
            .map(|idx| &self.eligible[idx])
    }

    pub fn ids(&self) -> impl Iterator<Item = ReviewerId> + '_ {
        self.eligible.iter().map(|r| r.id)
    }

    /// Reason a reviewer was excluded, if they were considered at all.
    pub fn exclusion(&self, reviewer: ReviewerId) -> Option<Ineligibility> {
        self.excluded
            .iter()
            .find(|r| r.id == reviewer)
            .map(|r| r.reason)
    }
}

/// Check one reviewer against one proposal.
pub fn evaluate(
    parties: &ProposalParties,
    load: &ReviewerLoad,
    caps: &AssignmentCaps,
) -> Result<(), Ineligibility> {
    if load.assignments_on_proposal > 0 {
        return Err(Ineligibility::AlreadyAssigned);
    }

    // Any single declaration touching the PI or any collaborator excludes.
    if let Some(researcher) = load.conflicts.iter().find(|r| parties.involves(**r)) {
        return Err(Ineligibility::Conflicted {
            researcher: *researcher,
        });
    }

    if !caps.reviewer_has_capacity(load.total_assignments) {
        return Err(Ineligibility::AtCapacity {
            assignments: load.total_assignments,
        });
    }

    Ok(())
}

/// Partition reviewers into eligible and excluded for one proposal.
pub fn resolve(
    parties: &ProposalParties,
    loads: impl IntoIterator<Item = ReviewerLoad>,
    caps: &AssignmentCaps,
) -> Eligibility {
    let mut eligibility = Eligibility::empty(parties.proposal);

    for load in loads {
        match evaluate(parties, &load, caps) {
            Ok(()) => eligibility.eligible.push(EligibleReviewer {
                id: load.reviewer,
                name: load.name,
            }),
            Err(reason) => eligibility.excluded.push(ExcludedReviewer {
                id: load.reviewer,
                name: load.name,
                reason,
            }),
        }
    }

    eligibility.eligible.sort_by_key(|r| r.id);
    eligibility.eligible.dedup_by_key(|r| r.id);
    eligibility.excluded.sort_by_key(|r| r.id);
    eligibility.excluded.dedup_by_key(|r| r.id);
    eligibility
}
