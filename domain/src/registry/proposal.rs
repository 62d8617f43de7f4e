//! Proposals and their award invariant
//!
//! A proposal may carry an awarded amount or awarded date only when its status
//! is [`ProposalStatus::Awarded`]. [`NewProposal::validate`] checks this before
//! anything reaches the store, so callers get a semantic error instead of a
//! raw trigger failure.

use crate::core::error::DomainError;
use crate::core::ids::{CompetitionId, ProposalId, ResearcherId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Requested amounts strictly above this make a proposal "large".
pub const LARGE_PROPOSAL_AMOUNT: f64 = 20_000.0;

/// More collaborators than this make a proposal "large".
pub const LARGE_PROPOSAL_COLLABORATORS: usize = 10;

/// Decision status of a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    Submitted,
    Awarded,
    #[serde(rename = "Not Awarded")]
    NotAwarded,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Submitted => "Submitted",
            ProposalStatus::Awarded => "Awarded",
            ProposalStatus::NotAwarded => "Not Awarded",
        }
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProposalStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Submitted" => Ok(ProposalStatus::Submitted),
            "Awarded" => Ok(ProposalStatus::Awarded),
            "Not Awarded" => Ok(ProposalStatus::NotAwarded),
            other => Err(DomainError::UnknownStatus {
                kind: "proposal",
                value: other.to_string(),
            }),
        }
    }
}

/// A proposal to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProposal {
    #[serde(default)]
    pub id: Option<ProposalId>,
    pub requested_amount: f64,
    pub competition: CompetitionId,
    pub principal_investigator: ResearcherId,
    pub status: ProposalStatus,
    #[serde(default)]
    pub awarded_amount: Option<f64>,
    #[serde(default)]
    pub awarded_date: Option<NaiveDate>,
}

impl NewProposal {
    /// A freshly submitted proposal with no award fields.
    pub fn submitted(
        requested_amount: f64,
        competition: CompetitionId,
        principal_investigator: ResearcherId,
    ) -> Self {
        Self {
            id: None,
            requested_amount,
            competition,
            principal_investigator,
            status: ProposalStatus::Submitted,
            awarded_amount: None,
            awarded_date: None,
        }
    }

    pub fn with_id(mut self, id: ProposalId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn awarded(mut self, amount: f64, date: NaiveDate) -> Self {
        self.status = ProposalStatus::Awarded;
        self.awarded_amount = Some(amount);
        self.awarded_date = Some(date);
        self
    }

    /// Check the amount and award invariants.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.requested_amount.is_finite() || self.requested_amount <= 0.0 {
            return Err(DomainError::NonPositiveAmount(self.requested_amount));
        }

        let has_award_fields = self.awarded_amount.is_some() || self.awarded_date.is_some();
        if has_award_fields && self.status != ProposalStatus::Awarded {
            return Err(DomainError::AwardOnNonAwarded {
                status: self.status.to_string(),
            });
        }

        if let Some(amount) = self.awarded_amount
            && (!amount.is_finite() || amount < 0.0)
        {
            return Err(DomainError::InvalidAwardAmount(amount));
        }

        Ok(())
    }
}
