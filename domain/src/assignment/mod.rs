//! Reviewer assignment domain.
//!
//! [`AssignmentSession`] is the state machine behind assigning reviewers to one
//! proposal; [`CandidateInput`] is what it consumes.

pub mod candidate;
pub mod session;

pub use candidate::{CandidateInput, STOP_TOKENS};
pub use session::{
    Admission, AssignmentOutcome, AssignmentSession, CandidateRejection, DoneReason,
    SessionEvent, SessionPhase,
};
