//! The closed set of council tables that can be viewed

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One of the ten tables of the council schema.
///
/// Table views go through this enum instead of interpolating a user-supplied
/// name into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Organization,
    Researcher,
    Competition,
    Proposal,
    ProposalCollaborator,
    Reviewer,
    ReviewAssignment,
    ConflictOfInterest,
    Meeting,
    MeetingParticipation,
}

impl Table {
    pub const ALL: [Table; 10] = [
        Table::Organization,
        Table::Researcher,
        Table::Competition,
        Table::Proposal,
        Table::ProposalCollaborator,
        Table::Reviewer,
        Table::ReviewAssignment,
        Table::ConflictOfInterest,
        Table::Meeting,
        Table::MeetingParticipation,
    ];

    /// Name of the table in the schema
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Organization => "Organization",
            Table::Researcher => "Researcher",
            Table::Competition => "Competition",
            Table::Proposal => "Proposal",
            Table::ProposalCollaborator => "ProposalCollaborator",
            Table::Reviewer => "Reviewer",
            Table::ReviewAssignment => "ReviewAssignment",
            Table::ConflictOfInterest => "ConflictOfInterest",
            Table::Meeting => "Meeting",
            Table::MeetingParticipation => "MeetingParticipation",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Table {
    type Err = DomainError;

    /// Case-insensitive; underscores and dashes are ignored so that
    /// `review_assignment` and `ReviewAssignment` name the same table.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        Table::ALL
            .into_iter()
            .find(|t| t.as_str().to_lowercase() == wanted)
            .ok_or_else(|| DomainError::UnknownTable(s.to_string()))
    }
}
