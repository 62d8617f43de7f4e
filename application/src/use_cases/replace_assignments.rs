//! Replace assignments use case
//!
//! Swaps a proposal's whole assignment set in one transaction. The new set is
//! validated up front against the eligibility rules as they would stand once
//! the current assignments are gone; nothing is written unless every reviewer
//! passes.

use super::resolve_eligibility::{ResolveEligibilityError, ResolveEligibilityUseCase};
use crate::config::{AssignmentParams, DeadlineOutOfRange};
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::council_store::{CouncilStore, StoreError};
use chrono::{Local, NaiveDate};
use council_domain::{
    EligibleReviewer, Ineligibility, NewAssignment, ProposalId, ReviewerId,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while replacing assignments. Nothing is written when
/// any of them is returned.
#[derive(Error, Debug)]
pub enum ReplaceAssignmentsError {
    #[error("Proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("Reviewer {0} is listed more than once")]
    DuplicateReviewer(ReviewerId),

    #[error("{requested} reviewers requested, but a proposal takes at most {cap}")]
    TooManyReviewers { requested: usize, cap: u32 },

    #[error("Reviewer {0} does not exist")]
    UnknownReviewer(ReviewerId),

    #[error("Reviewer {reviewer} is not eligible: {reason}")]
    Ineligible {
        reviewer: ReviewerId,
        reason: Ineligibility,
    },

    #[error("{0}")]
    Deadline(#[from] DeadlineOutOfRange),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ReplaceAssignmentsError {
    pub fn is_caller_error(&self) -> bool {
        match self {
            ReplaceAssignmentsError::Store(e) => e.is_caller_error(),
            _ => true,
        }
    }
}

impl From<ResolveEligibilityError> for ReplaceAssignmentsError {
    fn from(error: ResolveEligibilityError) -> Self {
        match error {
            ResolveEligibilityError::Store(e) => e.into(),
        }
    }
}

/// Input for the [`ReplaceAssignmentsUseCase`].
#[derive(Debug, Clone)]
pub struct ReplaceAssignmentsInput {
    pub proposal: ProposalId,
    pub reviewers: Vec<ReviewerId>,
    pub today: NaiveDate,
}

impl ReplaceAssignmentsInput {
    pub fn new(proposal: ProposalId, reviewers: Vec<ReviewerId>) -> Self {
        Self {
            proposal,
            reviewers,
            today: Local::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

/// Output from the [`ReplaceAssignmentsUseCase`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaceAssignmentsOutput {
    pub proposal: ProposalId,
    /// Assignments deleted
    pub removed: u32,
    /// Reviewers now assigned, in the order given
    pub assigned: Vec<EligibleReviewer>,
}

/// Use case for replacing a proposal's assignment set in one transaction.
#[derive(Clone)]
pub struct ReplaceAssignmentsUseCase {
    store: Arc<dyn CouncilStore>,
    resolver: ResolveEligibilityUseCase,
    params: AssignmentParams,
    audit_logger: Arc<dyn AuditLogger>,
}

impl ReplaceAssignmentsUseCase {
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

    pub async fn execute(
        &self,
        input: ReplaceAssignmentsInput,
    ) -> Result<ReplaceAssignmentsOutput, ReplaceAssignmentsError> {
        let proposal = input.proposal;
        let caps = self.params.caps;

        let mut seen = BTreeSet::new();
        if let Some(duplicate) = input.reviewers.iter().find(|r| !seen.insert(**r)) {
            return Err(ReplaceAssignmentsError::DuplicateReviewer(*duplicate));
        }
        if input.reviewers.len() > caps.per_proposal as usize {
            return Err(ReplaceAssignmentsError::TooManyReviewers {
                requested: input.reviewers.len(),
                cap: caps.per_proposal,
            });
        }

        let parties = self
            .store
            .proposal_parties(proposal)
            .await?
            .ok_or(ReplaceAssignmentsError::ProposalNotFound(proposal))?;
        let eligibility = self.resolver.resolve_without_current(&parties).await?;

        let mut assigned = Vec::with_capacity(input.reviewers.len());
        for reviewer in &input.reviewers {
            match eligibility.get(*reviewer) {
                Some(eligible) => assigned.push(eligible.clone()),
                None => {
                    return Err(match eligibility.exclusion(*reviewer) {
                        Some(reason) => ReplaceAssignmentsError::Ineligible {
                            reviewer: *reviewer,
                            reason,
                        },
                        None => ReplaceAssignmentsError::UnknownReviewer(*reviewer),
                    });
                }
            }
        }

        let deadline = self.params.review_deadline(input.today)?;
        let rows = assigned
            .iter()
            .map(|reviewer| NewAssignment {
                competition: parties.competition,
                reviewer: reviewer.id,
                proposal,
                deadline: Some(deadline),
                submitted: false,
            })
            .collect();

        let removed = self.store.replace_assignments(proposal, rows, caps).await?;
        info!(
            "Replaced {} assignment(s) of proposal {} with {}",
            removed,
            proposal,
            assigned.len()
        );
        self.audit_logger.log(AuditEvent::new(
            "assignments_replaced",
            json!({
                "proposal": proposal,
                "removed": removed,
                "reviewers": input.reviewers,
                "deadline": deadline,
            }),
        ));

        Ok(ReplaceAssignmentsOutput {
            proposal,
            removed,
            assigned,
        })
    }
}
