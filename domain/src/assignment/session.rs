//! Assignment session state machine
//!
//! One session assigns reviewers to one proposal. The session itself does no
//! I/O: the coordinator in the application layer feeds it candidate input and
//! the results of store reads and writes, and the session decides what happens
//! next.
//!
//! ```text
//! start ──┬── existing >= cap ───────────────► Done(CapReached)
//!         ├── no eligible reviewers ─────────► Done(NoEligibleReviewers)
//!         └──► Selecting
//!                │  admit(Stop) ─────────────► Done(Stopped)
//!                │  admit(bad input) ────────► Selecting (rejected)
//!                │  admit(eligible) ─► Write
//!                │       observe_count >= cap ► Done(CapReached)
//!                │       record_commit ──────► Selecting | Done(CapReached)
//!                │       record_failure ─────► Selecting
//! ```

use crate::core::ids::{ProposalId, ReviewerId};
use crate::eligibility::{AssignmentCaps, Eligibility, EligibleReviewer};
use serde::{Deserialize, Serialize};

use super::candidate::CandidateInput;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoneReason {
    /// The proposal holds the maximum number of assignments
    CapReached,
    /// Nobody could be assigned when the session started
    NoEligibleReviewers,
    /// The caller finished choosing
    Stopped,
}

impl std::fmt::Display for DoneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DoneReason::CapReached => write!(f, "assignment cap reached"),
            DoneReason::NoEligibleReviewers => write!(f, "no eligible reviewers"),
            DoneReason::Stopped => write!(f, "stopped"),
        }
    }
}

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Selecting,
    Done(DoneReason),
}

/// Why one candidate was refused. The session stays open after any of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rejection", rename_all = "snake_case")]
pub enum CandidateRejection {
    NotAnIdentifier { input: String },
    NotEligible { reviewer: ReviewerId },
    AlreadyCommitted { reviewer: ReviewerId },
}

impl std::fmt::Display for CandidateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateRejection::NotAnIdentifier { input } => {
                write!(f, "'{}' is not a valid reviewer id", input)
            }
            CandidateRejection::NotEligible { reviewer } => {
                write!(f, "reviewer {} is not eligible for this proposal", reviewer)
            }
            CandidateRejection::AlreadyCommitted { reviewer } => {
                write!(f, "reviewer {} was already assigned in this session", reviewer)
            }
        }
    }
}

/// What the coordinator should do with one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Write an assignment for this reviewer
    Write(EligibleReviewer),
    /// Refused; ask for another candidate
    Rejected(CandidateRejection),
    /// The session is over
    Finished(DoneReason),
}

/// Everything that happened to a candidate, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Rejected {
        input: String,
        #[serde(flatten)]
        rejection: CandidateRejection,
    },
    Committed {
        reviewer: ReviewerId,
        name: String,
    },
    WriteFailed {
        reviewer: ReviewerId,
        message: String,
    },
}

/// Final report of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub proposal: ProposalId,
    pub reason: DoneReason,
    /// Reviewers assigned during this session
    pub committed: Vec<EligibleReviewer>,
    /// Assignments the proposal held when the session started
    pub existing_count: u32,
    /// Assignments the proposal holds now, as last observed
    pub final_count: u32,
    pub cap: u32,
    pub events: Vec<SessionEvent>,
}

impl AssignmentOutcome {
    pub fn cap_reached(&self) -> bool {
        self.final_count >= self.cap
    }

    pub fn committed_count(&self) -> usize {
        self.committed.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SessionEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, SessionEvent::WriteFailed { .. }))
    }
}

/// State of one proposal-assignment session.
///
/// The eligible set is computed once at [`start`](Self::start). Reviewers
/// committed during the session are refused on later candidates even though
/// they remain in that set.
#[derive(Debug, Clone)]
pub struct AssignmentSession {
    eligibility: Eligibility,
    caps: AssignmentCaps,
    existing_count: u32,
    observed_count: u32,
    committed: Vec<EligibleReviewer>,
    events: Vec<SessionEvent>,
    phase: SessionPhase,
}

impl AssignmentSession {
    /// Open a session given the eligible set and the proposal's current count.
    pub fn start(eligibility: Eligibility, existing_count: u32, caps: AssignmentCaps) -> Self {
        let phase = if caps.proposal_is_full(existing_count) {
            SessionPhase::Done(DoneReason::CapReached)
        } else if eligibility.is_empty() {
            SessionPhase::Done(DoneReason::NoEligibleReviewers)
        } else {
            SessionPhase::Selecting
        };

        Self {
            eligibility,
            caps,
            existing_count,
            observed_count: existing_count,
            committed: Vec::new(),
            events: Vec::new(),
            phase,
        }
    }

    pub fn proposal(&self) -> ProposalId {
        self.eligibility.proposal
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, SessionPhase::Done(_))
    }

    pub fn eligibility(&self) -> &Eligibility {
        &self.eligibility
    }

    pub fn committed(&self) -> &[EligibleReviewer] {
        &self.committed
    }

    /// Eligible reviewers not yet committed in this session.
    pub fn remaining_candidates(&self) -> impl Iterator<Item = &EligibleReviewer> {
        self.eligibility
            .eligible
            .iter()
            .filter(|r| !self.is_committed(r.id))
    }

    /// Slots left on the proposal, as last observed.
    pub fn open_slots(&self) -> u32 {
        self.caps.remaining_for_proposal(self.observed_count)
    }

    /// Decide what to do with one candidate.
    pub fn admit(&mut self, input: &CandidateInput) -> Admission {
        if let SessionPhase::Done(reason) = self.phase {
            return Admission::Finished(reason);
        }

        let reviewer = match input {
            CandidateInput::Stop => {
                self.phase = SessionPhase::Done(DoneReason::Stopped);
                return Admission::Finished(DoneReason::Stopped);
            }
            CandidateInput::Malformed(text) => {
                return self.reject(
                    text.clone(),
                    CandidateRejection::NotAnIdentifier {
                        input: text.clone(),
                    },
                );
            }
            CandidateInput::Reviewer(id) => *id,
        };

        if self.is_committed(reviewer) {
            return self.reject(
                reviewer.to_string(),
                CandidateRejection::AlreadyCommitted { reviewer },
            );
        }

        match self.eligibility.get(reviewer) {
            Some(eligible) => Admission::Write(eligible.clone()),
            None => self.reject(
                reviewer.to_string(),
                CandidateRejection::NotEligible { reviewer },
            ),
        }
    }

    /// Feed the proposal's assignment count, re-read just before a write.
    ///
    /// Returns `false` (and ends the session) if the proposal is already full.
    pub fn observe_count(&mut self, count: u32) -> bool {
        self.observed_count = count;
        if self.caps.proposal_is_full(count) {
            self.phase = SessionPhase::Done(DoneReason::CapReached);
            false
        } else {
            true
        }
    }

    /// Record a committed assignment.
    pub fn record_commit(&mut self, reviewer: EligibleReviewer) {
        self.events.push(SessionEvent::Committed {
            reviewer: reviewer.id,
            name: reviewer.name.clone(),
        });
        self.committed.push(reviewer);
        self.observed_count += 1;

        if self.caps.proposal_is_full(self.observed_count) {
            self.phase = SessionPhase::Done(DoneReason::CapReached);
        }
    }

    /// Record a write that was rolled back. The session stays open.
    pub fn record_failure(&mut self, reviewer: ReviewerId, message: impl Into<String>) {
        self.events.push(SessionEvent::WriteFailed {
            reviewer,
            message: message.into(),
        });
    }

    /// Close the session and produce its report.
    pub fn finish(self) -> AssignmentOutcome {
        let reason = match self.phase {
            SessionPhase::Done(reason) => reason,
            SessionPhase::Selecting => DoneReason::Stopped,
        };

        AssignmentOutcome {
            proposal: self.eligibility.proposal,
            reason,
            committed: self.committed,
            existing_count: self.existing_count,
            final_count: self.observed_count,
            cap: self.caps.per_proposal,
            events: self.events,
        }
    }

    fn is_committed(&self, reviewer: ReviewerId) -> bool {
        self.committed.iter().any(|r| r.id == reviewer)
    }

    fn reject(&mut self, input: String, rejection: CandidateRejection) -> Admission {
        self.events.push(SessionEvent::Rejected {
            input,
            rejection: rejection.clone(),
        });
        Admission::Rejected(rejection)
    }
}
