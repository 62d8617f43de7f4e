//! Record registration use case
//!
//! Inserts council records one at a time or as a whole [`Dataset`]. Every
//! record is validated in the domain before it reaches the store. Review
//! assignments in a dataset go through the same eligibility rules and caps as
//! an interactive session and are rejected one by one, never in bulk.

use super::resolve_eligibility::{ResolveEligibilityError, ResolveEligibilityUseCase};
use crate::config::AssignmentParams;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::council_store::{CouncilStore, StoreError};
use council_domain::{
    CompetitionId, ConflictId, DomainError, MeetingId, MeetingParticipation, NewAssignment,
    NewCompetition, NewConflict, NewMeeting, NewOrganization, NewProposal, NewResearcher,
    OrganizationId, ProposalId, ResearcherId, ReviewerId, Table,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while registering records.
#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("Invalid record: {0}")]
    Invalid(#[from] DomainError),

    #[error("{table} record #{index} is invalid: {source}")]
    InvalidRecord {
        table: Table,
        index: usize,
        #[source]
        source: DomainError,
    },

    #[error("{table} record #{index} was refused: {source}")]
    Record {
        table: Table,
        index: usize,
        #[source]
        source: StoreError,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RegisterError {
    pub fn is_caller_error(&self) -> bool {
        match self {
            RegisterError::Invalid(_) | RegisterError::InvalidRecord { .. } => true,
            RegisterError::Record { source, .. } | RegisterError::Store(source) => {
                source.is_caller_error()
            }
        }
    }
}

impl From<ResolveEligibilityError> for RegisterError {
    fn from(error: ResolveEligibilityError) -> Self {
        match error {
            ResolveEligibilityError::Store(e) => RegisterError::Store(e),
        }
    }
}

/// A proposal/collaborator pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorLink {
    pub proposal: ProposalId,
    pub researcher: ResearcherId,
}

/// A full set of council records, as read from a dataset file.
///
/// Every list is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub organizations: Vec<NewOrganization>,
    #[serde(default)]
    pub researchers: Vec<NewResearcher>,
    #[serde(default)]
    pub competitions: Vec<NewCompetition>,
    #[serde(default)]
    pub proposals: Vec<NewProposal>,
    #[serde(default)]
    pub collaborators: Vec<CollaboratorLink>,
    /// Researchers who take the reviewer role
    #[serde(default)]
    pub reviewers: Vec<ResearcherId>,
    #[serde(default)]
    pub conflicts: Vec<NewConflict>,
    #[serde(default)]
    pub assignments: Vec<NewAssignment>,
    #[serde(default)]
    pub meetings: Vec<NewMeeting>,
    #[serde(default)]
    pub participations: Vec<MeetingParticipation>,
}

impl Dataset {
    /// Check every record's invariants without touching the store.
    pub fn validate(&self) -> Result<(), RegisterError> {
        fn check<T>(
            table: Table,
            records: &[T],
            validate: impl Fn(&T) -> Result<(), DomainError>,
        ) -> Result<(), RegisterError> {
            for (index, record) in records.iter().enumerate() {
                validate(record).map_err(|source| RegisterError::InvalidRecord {
                    table,
                    index,
                    source,
                })?;
            }
            Ok(())
        }

        check(Table::Organization, &self.organizations, NewOrganization::validate)?;
        check(Table::Researcher, &self.researchers, NewResearcher::validate)?;
        check(Table::Competition, &self.competitions, NewCompetition::validate)?;
        check(Table::Proposal, &self.proposals, NewProposal::validate)
    }
}

/// Rows inserted per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsertedCounts {
    pub organizations: usize,
    pub researchers: usize,
    pub competitions: usize,
    pub proposals: usize,
    pub collaborators: usize,
    pub reviewers: usize,
    pub conflicts: usize,
    pub assignments: usize,
    pub meetings: usize,
    pub participations: usize,
}

/// A seeded assignment that was not inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedRejection {
    pub index: usize,
    pub proposal: ProposalId,
    pub reviewer: ReviewerId,
    pub reason: String,
}

/// Result of loading a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub inserted: InsertedCounts,
    /// Collaborator pairs listed more than once
    pub duplicate_collaborators: usize,
    pub rejected_assignments: Vec<SeedRejection>,
}

/// Use case for inserting council records.
#[derive(Clone)]
pub struct RegisterRecordsUseCase {
    store: Arc<dyn CouncilStore>,
    resolver: ResolveEligibilityUseCase,
    params: AssignmentParams,
    audit_logger: Arc<dyn AuditLogger>,
}

impl RegisterRecordsUseCase {
    pub fn new(store: Arc<dyn CouncilStore>, params: AssignmentParams) -> Self {
        Self {
            resolver: ResolveEligibilityUseCase::new(store.clone(), params.caps),
            store,
            params,
            audit_logger: Arc::new(NoAuditLogger),
        }
    }

    /// Create with an audit logger.
    pub fn with_audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = logger;
        self
    }

    // ==================== Single records ====================

    pub async fn insert_organization(
        &self,
        organization: NewOrganization,
    ) -> Result<OrganizationId, RegisterError> {
        organization.validate()?;
        Ok(self.store.insert_organization(organization).await?)
    }

    pub async fn insert_researcher(
        &self,
        researcher: NewResearcher,
    ) -> Result<ResearcherId, RegisterError> {
        researcher.validate()?;
        Ok(self.store.insert_researcher(researcher).await?)
    }

    pub async fn insert_competition(
        &self,
        competition: NewCompetition,
    ) -> Result<CompetitionId, RegisterError> {
        competition.validate()?;
        Ok(self.store.insert_competition(competition).await?)
    }

    /// Insert a proposal after checking its amount and award invariant.
    pub async fn insert_proposal(&self, proposal: NewProposal) -> Result<ProposalId, RegisterError> {
        proposal.validate()?;
        Ok(self.store.insert_proposal(proposal).await?)
    }

    /// Returns `false` if the pair was already recorded.
    pub async fn add_collaborator(
        &self,
        proposal: ProposalId,
        researcher: ResearcherId,
    ) -> Result<bool, RegisterError> {
        Ok(self.store.add_collaborator(proposal, researcher).await?)
    }

    pub async fn insert_reviewer(&self, researcher: ResearcherId) -> Result<ReviewerId, RegisterError> {
        Ok(self.store.insert_reviewer(researcher).await?)
    }

    pub async fn insert_conflict(&self, conflict: NewConflict) -> Result<ConflictId, RegisterError> {
        Ok(self.store.insert_conflict(conflict).await?)
    }

    pub async fn insert_meeting(&self, meeting: NewMeeting) -> Result<MeetingId, RegisterError> {
        Ok(self.store.insert_meeting(meeting).await?)
    }

    pub async fn add_meeting_participant(
        &self,
        participation: MeetingParticipation,
    ) -> Result<(), RegisterError> {
        Ok(self.store.add_meeting_participant(participation).await?)
    }

    // ==================== Datasets ====================

    /// Insert a whole dataset in dependency order.
    ///
    /// All records are validated before the first write. A store refusal of
    /// any record other than an assignment stops the load; rejected
    /// assignments are listed in the report instead.
    pub async fn load_dataset(&self, dataset: Dataset) -> Result<LoadReport, RegisterError> {
        dataset.validate()?;
        let mut report = LoadReport::default();

        for (index, organization) in dataset.organizations.into_iter().enumerate() {
            self.store
                .insert_organization(organization)
                .await
                .map_err(record_error(Table::Organization, index))?;
            report.inserted.organizations += 1;
        }

        for (index, researcher) in dataset.researchers.into_iter().enumerate() {
            self.store
                .insert_researcher(researcher)
                .await
                .map_err(record_error(Table::Researcher, index))?;
            report.inserted.researchers += 1;
        }

        for (index, competition) in dataset.competitions.into_iter().enumerate() {
            self.store
                .insert_competition(competition)
                .await
                .map_err(record_error(Table::Competition, index))?;
            report.inserted.competitions += 1;
        }

        for (index, proposal) in dataset.proposals.into_iter().enumerate() {
            self.store
                .insert_proposal(proposal)
                .await
                .map_err(record_error(Table::Proposal, index))?;
            report.inserted.proposals += 1;
        }

        for (index, link) in dataset.collaborators.into_iter().enumerate() {
            let added = self
                .store
                .add_collaborator(link.proposal, link.researcher)
                .await
                .map_err(record_error(Table::ProposalCollaborator, index))?;
            if added {
                report.inserted.collaborators += 1;
            } else {
                debug!(
                    "Skipping duplicate collaborator {} on proposal {}",
                    link.researcher, link.proposal
                );
                report.duplicate_collaborators += 1;
            }
        }

        for (index, researcher) in dataset.reviewers.into_iter().enumerate() {
            self.store
                .insert_reviewer(researcher)
                .await
                .map_err(record_error(Table::Reviewer, index))?;
            report.inserted.reviewers += 1;
        }

        for (index, conflict) in dataset.conflicts.into_iter().enumerate() {
            self.store
                .insert_conflict(conflict)
                .await
                .map_err(record_error(Table::ConflictOfInterest, index))?;
            report.inserted.conflicts += 1;
        }

        for (index, meeting) in dataset.meetings.into_iter().enumerate() {
            self.store
                .insert_meeting(meeting)
                .await
                .map_err(record_error(Table::Meeting, index))?;
            report.inserted.meetings += 1;
        }

        for (index, participation) in dataset.participations.into_iter().enumerate() {
            self.store
                .add_meeting_participant(participation)
                .await
                .map_err(record_error(Table::MeetingParticipation, index))?;
            report.inserted.participations += 1;
        }

        for (index, assignment) in dataset.assignments.into_iter().enumerate() {
            let (proposal, reviewer) = (assignment.proposal, assignment.reviewer);
            match self.seed_assignment(assignment).await? {
                None => report.inserted.assignments += 1,
                Some(reason) => {
                    warn!(
                        "Rejected seeded assignment #{} (reviewer {} on proposal {}): {}",
                        index, reviewer, proposal, reason
                    );
                    report.rejected_assignments.push(SeedRejection {
                        index,
                        proposal,
                        reviewer,
                        reason,
                    });
                }
            }
        }

        info!(
            "Dataset loaded: {} proposals, {} reviewers, {} assignments ({} rejected)",
            report.inserted.proposals,
            report.inserted.reviewers,
            report.inserted.assignments,
            report.rejected_assignments.len()
        );
        self.audit_logger.log(AuditEvent::new(
            "dataset_loaded",
            json!({
                "inserted": report.inserted,
                "duplicate_collaborators": report.duplicate_collaborators,
                "rejected_assignments": report.rejected_assignments,
            }),
        ));

        Ok(report)
    }

    /// Insert one seeded assignment if the rules allow it.
    ///
    /// Returns the rejection reason, or `None` once the row is committed.
    async fn seed_assignment(
        &self,
        assignment: NewAssignment,
    ) -> Result<Option<String>, RegisterError> {
        let caps = self.params.caps;

        let Some(parties) = self.store.proposal_parties(assignment.proposal).await? else {
            return Ok(Some(format!("proposal {} not found", assignment.proposal)));
        };
        if parties.competition != assignment.competition {
            return Ok(Some(format!(
                "competition {} does not match the proposal's competition {}",
                assignment.competition, parties.competition
            )));
        }

        let count = self.store.assignment_count(assignment.proposal).await?;
        if caps.proposal_is_full(count) {
            return Ok(Some(format!(
                "proposal already has {} assignments",
                count
            )));
        }

        let eligibility = self.resolver.resolve_for(&parties).await?;
        if !eligibility.contains(assignment.reviewer) {
            return Ok(Some(match eligibility.exclusion(assignment.reviewer) {
                Some(reason) => reason.to_string(),
                None => format!("researcher {} is not a reviewer", assignment.reviewer),
            }));
        }

        match self.store.insert_assignment(assignment, caps).await {
            Ok(_) => Ok(None),
            Err(e) if e.is_fatal() => Err(RegisterError::Store(e)),
            Err(e) => Ok(Some(e.to_string())),
        }
    }
}

fn record_error(table: Table, index: usize) -> impl FnOnce(StoreError) -> RegisterError {
    move |source| RegisterError::Record {
        table,
        index,
        source,
    }
}
