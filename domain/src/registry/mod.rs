//! Council records domain.
//!
//! - [`entities`]: organizations, researchers, competitions, conflicts, assignments, meetings
//! - [`proposal`]: proposals, their status and the award invariant
//! - [`table::Table`]: the closed set of viewable tables

pub mod entities;
pub mod proposal;
pub mod table;

pub use entities::{
    Competition, CompetitionStatus, ConflictOfInterest, Meeting, MeetingParticipation,
    NewAssignment, NewCompetition, NewConflict, NewMeeting, NewOrganization, NewResearcher,
    Organization, Researcher, ReviewAssignment, full_name,
};
pub use proposal::{
    LARGE_PROPOSAL_AMOUNT, LARGE_PROPOSAL_COLLABORATORS, NewProposal, ProposalStatus,
};
pub use table::Table;
