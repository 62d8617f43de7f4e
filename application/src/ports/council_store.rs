//! Council store port
//!
//! Defines the [`CouncilStore`] trait, the only way use cases read or write
//! council records.
//!
//! # Architecture
//!
//! - **Port**: [`CouncilStore`] - defined here in application layer
//! - **Adapter**: `SqliteCouncilStore` - implemented in infrastructure layer
//!
//! Every method is one logical operation. Methods that write more than one row
//! ([`CouncilStore::replace_assignments`]) or that must re-check a limit before
//! writing ([`CouncilStore::insert_assignment`]) are atomic: either every
//! change is committed or none is.

use async_trait::async_trait;
use chrono::NaiveDate;
use council_domain::{
    AssignmentCaps, AssignmentId, CompetitionId, CompetitionSummary, ConflictId,
    DiscrepancyReport, MeetingId, MeetingParticipation, Month, NewAssignment, NewCompetition,
    NewConflict, NewMeeting, NewOrganization, NewProposal, NewResearcher, OrganizationId,
    ProposalAmount, ProposalId, ProposalParties, ResearcherId, ReviewTask, ReviewerId,
    ReviewerLoad, Table, TableDump,
};
use thiserror::Error;

/// Errors reported by a [`CouncilStore`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A referenced row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A schema constraint rejected the write (unique, foreign key, check, trigger).
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// An assignment cap would be exceeded by the write.
    #[error("Assignment cap exceeded: {0}")]
    CapExceeded(String),

    /// The store cannot be reached at all.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Any other storage failure.
    #[error("Storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn storage(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Storage {
            operation,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Whether the store is gone and no further operation can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }

    /// Whether the failure was caused by the data the caller supplied.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::Constraint(_) | StoreError::CapExceeded(_)
        )
    }
}

/// Persistent storage for council records.
#[async_trait]
pub trait CouncilStore: Send + Sync {
    // ==================== Eligibility reads ====================

    /// PI and collaborators of a proposal, or `None` if it does not exist.
    async fn proposal_parties(
        &self,
        proposal: ProposalId,
    ) -> Result<Option<ProposalParties>, StoreError>;

    /// Every reviewer with their assignment counts and conflicts, as seen
    /// from the given proposal.
    async fn reviewer_loads(&self, proposal: ProposalId) -> Result<Vec<ReviewerLoad>, StoreError>;

    /// Number of assignments the proposal currently holds.
    async fn assignment_count(&self, proposal: ProposalId) -> Result<u32, StoreError>;

    // ==================== Assignment writes ====================

    /// Insert one assignment.
    ///
    /// Both caps are re-checked inside the same transaction as the insert;
    /// [`StoreError::CapExceeded`] is returned and nothing is written if either
    /// would be exceeded.
    async fn insert_assignment(
        &self,
        assignment: NewAssignment,
        caps: AssignmentCaps,
    ) -> Result<AssignmentId, StoreError>;

    /// Delete the proposal's assignments and insert `assignments` in one
    /// transaction. Returns how many rows were removed.
    async fn replace_assignments(
        &self,
        proposal: ProposalId,
        assignments: Vec<NewAssignment>,
        caps: AssignmentCaps,
    ) -> Result<u32, StoreError>;

    // ==================== Reports ====================

    async fn open_competitions_with_large_proposals(
        &self,
        month: Month,
    ) -> Result<Vec<CompetitionSummary>, StoreError>;

    /// Proposals whose requested amount is the largest in the area, ties included.
    async fn largest_requested_in_area(&self, area: &str)
    -> Result<Vec<ProposalAmount>, StoreError>;

    /// Proposals with the largest awarded amount among those awarded strictly
    /// before `date`, ties included.
    async fn largest_awarded_before(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ProposalAmount>, StoreError>;

    async fn discrepancy_in_area(&self, area: &str) -> Result<DiscrepancyReport, StoreError>;

    /// Proposals assigned to the reviewer whose full name matches exactly.
    async fn review_tasks(&self, reviewer_name: &str) -> Result<Vec<ReviewTask>, StoreError>;

    async fn dump_table(&self, table: Table) -> Result<TableDump, StoreError>;

    // ==================== Record inserts ====================

    async fn insert_organization(
        &self,
        organization: NewOrganization,
    ) -> Result<OrganizationId, StoreError>;

    async fn insert_researcher(&self, researcher: NewResearcher)
    -> Result<ResearcherId, StoreError>;

    async fn insert_competition(
        &self,
        competition: NewCompetition,
    ) -> Result<CompetitionId, StoreError>;

    async fn insert_proposal(&self, proposal: NewProposal) -> Result<ProposalId, StoreError>;

    /// Attach a collaborator. Returns `false` if the pair already existed.
    async fn add_collaborator(
        &self,
        proposal: ProposalId,
        researcher: ResearcherId,
    ) -> Result<bool, StoreError>;

    /// Give a researcher the reviewer role.
    async fn insert_reviewer(&self, researcher: ResearcherId) -> Result<ReviewerId, StoreError>;

    async fn insert_conflict(&self, conflict: NewConflict) -> Result<ConflictId, StoreError>;

    async fn insert_meeting(&self, meeting: NewMeeting) -> Result<MeetingId, StoreError>;

    async fn add_meeting_participant(
        &self,
        participation: MeetingParticipation,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_fatal() {
        assert!(StoreError::Unavailable("disk gone".into()).is_fatal());
        assert!(!StoreError::Constraint("UNIQUE".into()).is_fatal());
        assert!(!StoreError::storage("insert", "busy").is_fatal());
    }

    #[test]
    fn test_caller_errors() {
        assert!(StoreError::not_found("proposal", 99).is_caller_error());
        assert!(StoreError::CapExceeded("proposal 1 holds 3".into()).is_caller_error());
        assert!(!StoreError::Unavailable("gone".into()).is_caller_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StoreError::not_found("proposal", 99).to_string(),
            "proposal 99 not found"
        );
        assert_eq!(
            StoreError::storage("insert_assignment", "database is locked").to_string(),
            "Storage error during insert_assignment: database is locked"
        );
    }
}
