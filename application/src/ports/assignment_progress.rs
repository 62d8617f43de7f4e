//! Progress notification port for assignment sessions
//!
//! Implementations live in the presentation layer and show what happened to
//! each candidate as the session runs.

use super::council_store::StoreError;
use council_domain::{
    AssignmentOutcome, AssignmentSession, CandidateInput, CandidateRejection, EligibleReviewer,
    ReviewerId,
};

/// Callback for progress updates during an assignment session.
///
/// Every method has an empty default so adapters only implement what they show.
pub trait AssignmentProgressNotifier: Send + Sync {
    /// Called once the eligible set has been computed.
    fn on_session_start(&self, _session: &AssignmentSession) {}

    /// Called when a candidate is refused without touching the store.
    fn on_rejected(&self, _input: &CandidateInput, _rejection: &CandidateRejection) {}

    /// Called after an assignment is committed.
    fn on_committed(&self, _reviewer: &EligibleReviewer, _count: u32, _cap: u32) {}

    /// Called when a write was rolled back.
    fn on_write_failed(&self, _reviewer: ReviewerId, _error: &StoreError) {}

    /// Called when the session ends.
    fn on_session_end(&self, _outcome: &AssignmentOutcome) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoAssignmentProgress;

impl AssignmentProgressNotifier for NoAssignmentProgress {}
