//! Domain layer for grant-council
//!
//! This crate contains the council's records, their invariants and the pure
//! rules behind reviewer assignment. It has no dependencies on storage or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Eligibility
//!
//! A reviewer is eligible for a proposal when they are not already assigned
//! to it, have no declared conflict with its PI or any collaborator, and hold
//! fewer assignments than the per-reviewer cap. See [`eligibility`].
//!
//! ## Assignment sessions
//!
//! An [`AssignmentSession`] assigns reviewers to one proposal, one candidate at
//! a time, until the proposal is full, the caller stops, or nobody is eligible.

pub mod assignment;
pub mod config;
pub mod core;
pub mod eligibility;
pub mod registry;
pub mod report;

// Re-export commonly used types
pub use assignment::{
    Admission, AssignmentOutcome, AssignmentSession, CandidateInput, CandidateRejection,
    DoneReason, SessionEvent, SessionPhase,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{
    error::DomainError,
    ids::{
        AssignmentId, CompetitionId, ConflictId, MeetingId, OrganizationId, ProposalId,
        ResearcherId, ReviewerId,
    },
    month::Month,
};
pub use eligibility::{
    AssignmentCaps, Eligibility, EligibleReviewer, ExcludedReviewer, Ineligibility,
    ProposalParties, ReviewerLoad,
};
pub use registry::{
    Competition, CompetitionStatus, ConflictOfInterest, Meeting, MeetingParticipation,
    NewAssignment, NewCompetition, NewConflict, NewMeeting, NewOrganization, NewProposal,
    NewResearcher, Organization, ProposalStatus, Researcher, ReviewAssignment, Table,
};
pub use report::{Cell, CompetitionSummary, DiscrepancyReport, ProposalAmount, ReviewTask, TableDump};
