//! Read-side snapshots the eligibility rules are evaluated over
//!
//! The store produces these in one read pass; the rules themselves never
//! touch the store.

use crate::core::ids::{CompetitionId, ProposalId, ResearcherId, ReviewerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The researchers attached to a proposal: its PI and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalParties {
    pub proposal: ProposalId,
    pub competition: CompetitionId,
    pub principal_investigator: ResearcherId,
    pub collaborators: BTreeSet<ResearcherId>,
}

impl ProposalParties {
    pub fn new(
        proposal: ProposalId,
        competition: CompetitionId,
        principal_investigator: ResearcherId,
    ) -> Self {
        Self {
            proposal,
            competition,
            principal_investigator,
            collaborators: BTreeSet::new(),
        }
    }

    pub fn with_collaborators(
        mut self,
        collaborators: impl IntoIterator<Item = ResearcherId>,
    ) -> Self {
        self.collaborators.extend(collaborators);
        self
    }

    /// Whether the researcher is the PI or one of the collaborators.
    pub fn involves(&self, researcher: ResearcherId) -> bool {
        self.principal_investigator == researcher || self.collaborators.contains(&researcher)
    }
}

/// Everything the rules need to know about one reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerLoad {
    pub reviewer: ReviewerId,
    pub name: String,
    /// Assignments across all proposals, including this one
    pub total_assignments: u32,
    /// Assignments to the proposal under consideration
    pub assignments_on_proposal: u32,
    /// Researchers this reviewer has declared a conflict with
    pub conflicts: BTreeSet<ResearcherId>,
}

impl ReviewerLoad {
    pub fn new(reviewer: ReviewerId, name: impl Into<String>) -> Self {
        Self {
            reviewer,
            name: name.into(),
            total_assignments: 0,
            assignments_on_proposal: 0,
            conflicts: BTreeSet::new(),
        }
    }

    pub fn with_assignments(mut self, total: u32, on_proposal: u32) -> Self {
        self.total_assignments = total;
        self.assignments_on_proposal = on_proposal;
        self
    }

    pub fn with_conflicts(mut self, conflicts: impl IntoIterator<Item = ResearcherId>) -> Self {
        self.conflicts.extend(conflicts);
        self
    }

    /// The load as it would be once this proposal's assignments are deleted.
    ///
    /// Used when an assignment set is replaced wholesale.
    pub fn without_proposal_assignments(mut self) -> Self {
        self.total_assignments = self
            .total_assignments
            .saturating_sub(self.assignments_on_proposal);
        self.assignments_on_proposal = 0;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_involves_pi_and_collaborators() {
        let parties = ProposalParties::new(ProposalId(1), CompetitionId(4), ResearcherId(15))
            .with_collaborators([ResearcherId(8), ResearcherId(17)]);

        assert!(parties.involves(ResearcherId(15)));
        assert!(parties.involves(ResearcherId(17)));
        assert!(!parties.involves(ResearcherId(3)));
    }

    #[test]
    fn test_without_proposal_assignments() {
        let load = ReviewerLoad::new(ReviewerId(3), "James Shaw")
            .with_assignments(3, 1)
            .without_proposal_assignments();

        assert_eq!(load.total_assignments, 2);
        assert_eq!(load.assignments_on_proposal, 0);
    }
}
