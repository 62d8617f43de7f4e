//! Resolve eligibility use case
//!
//! Reads one proposal's parties and every reviewer's load from the store, then
//! applies the pure rules in [`council_domain::eligibility`]. Read-only: running
//! it twice without an intervening write yields the same result.

use crate::ports::council_store::{CouncilStore, StoreError};
use council_domain::eligibility::resolve;
use council_domain::{AssignmentCaps, Eligibility, ProposalId, ProposalParties};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while resolving eligibility.
#[derive(Error, Debug)]
pub enum ResolveEligibilityError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ResolveEligibilityError {
    pub fn is_caller_error(&self) -> bool {
        match self {
            ResolveEligibilityError::Store(e) => e.is_caller_error(),
        }
    }
}

/// Use case for computing which reviewers may be assigned to a proposal.
#[derive(Clone)]
pub struct ResolveEligibilityUseCase {
    store: Arc<dyn CouncilStore>,
    caps: AssignmentCaps,
}

impl ResolveEligibilityUseCase {
    pub fn new(store: Arc<dyn CouncilStore>, caps: AssignmentCaps) -> Self {
        Self { store, caps }
    }

    pub fn caps(&self) -> AssignmentCaps {
        self.caps
    }

    /// Eligible and excluded reviewers for `proposal`.
    ///
    /// An unknown proposal yields an empty result rather than an error.
    pub async fn execute(&self, proposal: ProposalId) -> Result<Eligibility, ResolveEligibilityError> {
        match self.store.proposal_parties(proposal).await? {
            Some(parties) => self.resolve_for(&parties).await,
            None => {
                debug!("Proposal {} not found, no reviewers are eligible", proposal);
                Ok(Eligibility::empty(proposal))
            }
        }
    }

    /// Eligibility for a proposal whose parties are already loaded.
    pub async fn resolve_for(
        &self,
        parties: &ProposalParties,
    ) -> Result<Eligibility, ResolveEligibilityError> {
        let loads = self.store.reviewer_loads(parties.proposal).await?;
        let eligibility = resolve(parties, loads, &self.caps);
        debug!(
            "Proposal {}: {} eligible, {} excluded",
            parties.proposal,
            eligibility.eligible.len(),
            eligibility.excluded.len()
        );
        Ok(eligibility)
    }

    /// Eligibility as if the proposal's current assignments were deleted.
    ///
    /// Used to validate a replacement set before it is written.
    pub async fn resolve_without_current(
        &self,
        parties: &ProposalParties,
    ) -> Result<Eligibility, ResolveEligibilityError> {
        let loads = self
            .store
            .reviewer_loads(parties.proposal)
            .await?
            .into_iter()
            .map(|load| load.without_proposal_assignments());
        Ok(resolve(parties, loads, &self.caps))
    }
}
