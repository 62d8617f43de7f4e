//! Council records: organizations, researchers, competitions and meetings
//!
//! Each entity has a persisted form (with its id) and a `New*` form used for
//! inserts, where the id is optional so the store can assign one.

use crate::core::error::DomainError;
use crate::core::ids::{
    AssignmentId, CompetitionId, ConflictId, MeetingId, OrganizationId, ProposalId, ResearcherId,
    ReviewerId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A research organization (university, institute, company)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrganization {
    #[serde(default)]
    pub id: Option<OrganizationId>,
    pub name: String,
    pub address: String,
}

impl NewOrganization {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("organization_name", &self.name)?;
        require_text("organization_address", &self.address)
    }
}

/// A researcher; the base identity behind PIs, collaborators and reviewers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Researcher {
    pub id: ResearcherId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub organization: Option<OrganizationId>,
}

impl Researcher {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewResearcher {
    #[serde(default)]
    pub id: Option<ResearcherId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub organization: Option<OrganizationId>,
}

impl NewResearcher {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_text("email", &self.email)?;
        if !self.email.contains('@') {
            return Err(DomainError::invalid_field(
                "email",
                format!("'{}' is not an email address", self.email),
            ));
        }
        Ok(())
    }
}

/// Display name used across reports: first and last name joined by one space.
pub fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first, last)
}

/// Whether a competition still accepts proposals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetitionStatus {
    Open,
    Closed,
}

impl CompetitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionStatus::Open => "Open",
            CompetitionStatus::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CompetitionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(CompetitionStatus::Open),
            "Closed" => Ok(CompetitionStatus::Closed),
            other => Err(DomainError::UnknownStatus {
                kind: "competition",
                value: other.to_string(),
            }),
        }
    }
}

/// A funding competition that proposals are submitted to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub number: i64,
    pub title: String,
    pub description: Option<String>,
    pub area: Option<String>,
    pub status: CompetitionStatus,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCompetition {
    #[serde(default)]
    pub id: Option<CompetitionId>,
    pub number: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    pub status: CompetitionStatus,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

impl NewCompetition {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("competition_title", &self.title)
    }
}

/// Declares that a reviewer must not review anything touching a researcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictOfInterest {
    pub id: ConflictId,
    pub reviewer: ReviewerId,
    pub conflicted_researcher: ResearcherId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConflict {
    #[serde(default)]
    pub id: Option<ConflictId>,
    pub reviewer: ReviewerId,
    pub conflicted_researcher: ResearcherId,
}

/// One reviewer's assignment to review one proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAssignment {
    pub id: AssignmentId,
    pub competition: CompetitionId,
    pub reviewer: ReviewerId,
    pub proposal: ProposalId,
    pub deadline: Option<NaiveDate>,
    pub submitted: bool,
}

/// Row to insert into `ReviewAssignment`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAssignment {
    pub competition: CompetitionId,
    pub reviewer: ReviewerId,
    pub proposal: ProposalId,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub submitted: bool,
}

/// A panel meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMeeting {
    #[serde(default)]
    pub id: Option<MeetingId>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// A reviewer taking part in a meeting about one competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeetingParticipation {
    pub meeting: MeetingId,
    pub competition: CompetitionId,
    pub reviewer: ReviewerId,
}

fn require_text(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        Err(DomainError::invalid_field(field, "cannot be empty"))
    } else {
        Ok(())
    }
}
