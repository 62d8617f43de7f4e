//! Assign reviewers use case
//!
//! Drives an [`AssignmentSession`] for one proposal: pulls candidates from a
//! [`CandidateSource`], lets the session decide, and performs the store reads
//! and writes the session asks for.
//!
//! # Flow
//!
//! ```text
//! proposal exists? ── no ──► ProposalNotFound
//!        │
//! resolve eligibility, read assignment count
//!        │
//! AssignmentSession::start ── done? ──► outcome (no writes)
//!        │
//! loop: next_candidate ─► admit
//!        Write(reviewer) ─► re-read count ─► insert_assignment (cap re-check in tx)
//!                             ├── committed  ─► record_commit
//!                             ├── rolled back ─► record_failure, keep selecting
//!                             └── unavailable ─► StoreUnavailable
//! ```

use super::resolve_eligibility::{ResolveEligibilityError, ResolveEligibilityUseCase};
use crate::config::{AssignmentParams, DeadlineOutOfRange};
use crate::ports::assignment_progress::AssignmentProgressNotifier;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::candidate_source::{CandidateSource, CandidateSourceError};
use crate::ports::council_store::{CouncilStore, StoreError};
use chrono::{Local, NaiveDate};
use council_domain::{
    Admission, AssignmentOutcome, AssignmentSession, CandidateInput, NewAssignment, ProposalId,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort an assignment session.
///
/// Rejected candidates and rolled-back writes are not errors; they are
/// recorded in the [`AssignmentOutcome`].
#[derive(Error, Debug)]
pub enum AssignReviewersError {
    #[error("Proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("{0}")]
    Deadline(#[from] DeadlineOutOfRange),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(StoreError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl AssignReviewersError {
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AssignReviewersError::ProposalNotFound(_) | AssignReviewersError::Deadline(_)
        )
    }
}

impl From<StoreError> for AssignReviewersError {
    fn from(error: StoreError) -> Self {
        if error.is_fatal() {
            AssignReviewersError::StoreUnavailable(error)
        } else {
            AssignReviewersError::Store(error)
        }
    }
}

impl From<ResolveEligibilityError> for AssignReviewersError {
    fn from(error: ResolveEligibilityError) -> Self {
        match error {
            ResolveEligibilityError::Store(e) => e.into(),
        }
    }
}

/// Input for the [`AssignReviewersUseCase`].
#[derive(Debug, Clone)]
pub struct AssignReviewersInput {
    pub proposal: ProposalId,
    /// Date the assignments are made; review deadlines count from here.
    pub today: NaiveDate,
}

impl AssignReviewersInput {
    pub fn new(proposal: ProposalId) -> Self {
        Self {
            proposal,
            today: Local::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

/// Use case for assigning reviewers to one proposal.
#[derive(Clone)]
pub struct AssignReviewersUseCase {
    store: Arc<dyn CouncilStore>,
    resolver: ResolveEligibilityUseCase,
    params: AssignmentParams,
    audit_logger: Arc<dyn AuditLogger>,
}

impl AssignReviewersUseCase {
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

    /// Run one session to completion.
    pub async fn execute(
        &self,
        input: AssignReviewersInput,
        source: &mut dyn CandidateSource,
        progress: &dyn AssignmentProgressNotifier,
    ) -> Result<AssignmentOutcome, AssignReviewersError> {
        let proposal = input.proposal;
        let caps = self.params.caps;
        let deadline = self.params.review_deadline(input.today)?;

        let parties = self
            .store
            .proposal_parties(proposal)
            .await?
            .ok_or(AssignReviewersError::ProposalNotFound(proposal))?;

        let eligibility = self.resolver.resolve_for(&parties).await?;
        let existing = self.store.assignment_count(proposal).await?;
        info!(
            "Assigning reviewers to proposal {}: {} existing, {} eligible, {}",
            proposal,
            existing,
            eligibility.len(),
            caps
        );

        let mut session = AssignmentSession::start(eligibility, existing, caps);
        progress.on_session_start(&session);
        self.audit_logger.log(AuditEvent::new(
            "assignment_session_started",
            json!({
                "proposal": proposal,
                "existing": existing,
                "eligible": session.eligibility().ids().collect::<Vec<_>>(),
                "phase": session.phase(),
            }),
        ));

        while !session.is_done() {
            let candidate = match source.next_candidate(&session).await {
                Ok(candidate) => candidate,
                Err(CandidateSourceError::Closed) => CandidateInput::Stop,
                Err(e) => {
                    warn!("Candidate input failed, stopping session: {}", e);
                    CandidateInput::Stop
                }
            };

            let reviewer = match session.admit(&candidate) {
                Admission::Write(reviewer) => reviewer,
                Admission::Rejected(rejection) => {
                    debug!("Rejected candidate '{}': {}", candidate, rejection);
                    progress.on_rejected(&candidate, &rejection);
                    self.audit_logger.log(AuditEvent::new(
                        "candidate_rejected",
                        json!({
                            "proposal": proposal,
                            "input": candidate.to_string(),
                            "rejection": rejection,
                        }),
                    ));
                    continue;
                }
                Admission::Finished(_) => break,
            };

            let count = match self.store.assignment_count(proposal).await {
                Ok(count) => count,
                Err(e) if e.is_fatal() => return Err(AssignReviewersError::StoreUnavailable(e)),
                Err(e) => {
                    warn!("Could not re-read assignment count: {}", e);
                    progress.on_write_failed(reviewer.id, &e);
                    session.record_failure(reviewer.id, e.to_string());
                    continue;
                }
            };
            if !session.observe_count(count) {
                info!("Proposal {} filled up during the session", proposal);
                break;
            }

            let row = NewAssignment {
                competition: parties.competition,
                reviewer: reviewer.id,
                proposal,
                deadline: Some(deadline),
                submitted: false,
            };

            match self.store.insert_assignment(row, caps).await {
                Ok(assignment) => {
                    info!(
                        "Assigned reviewer {} ({}) to proposal {}",
                        reviewer.id, reviewer.name, proposal
                    );
                    progress.on_committed(&reviewer, count + 1, caps.per_proposal);
                    self.audit_logger.log(AuditEvent::new(
                        "assignment_committed",
                        json!({
                            "assignment": assignment,
                            "proposal": proposal,
                            "reviewer": reviewer.id,
                            "deadline": deadline,
                        }),
                    ));
                    session.record_commit(reviewer);
                }
                Err(e) if e.is_fatal() => {
                    return Err(AssignReviewersError::StoreUnavailable(e));
                }
                Err(e) => {
                    warn!(
                        "Assignment of reviewer {} to proposal {} rolled back: {}",
                        reviewer.id, proposal, e
                    );
                    progress.on_write_failed(reviewer.id, &e);
                    self.audit_logger.log(AuditEvent::new(
                        "assignment_failed",
                        json!({
                            "proposal": proposal,
                            "reviewer": reviewer.id,
                            "error": e.to_string(),
                        }),
                    ));
                    session.record_failure(reviewer.id, e.to_string());
                }
            }
        }

        let outcome = session.finish();
        info!(
            "Session for proposal {} ended ({}): {} committed, {}/{} assigned",
            proposal,
            outcome.reason,
            outcome.committed_count(),
            outcome.final_count,
            outcome.cap
        );
        self.audit_logger.log(AuditEvent::new(
            "assignment_session_finished",
            json!({
                "proposal": proposal,
                "reason": outcome.reason,
                "committed": outcome.committed.iter().map(|r| r.id).collect::<Vec<_>>(),
                "final_count": outcome.final_count,
            }),
        ));
        progress.on_session_end(&outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::assignment_progress::NoAssignmentProgress;
    use crate::ports::candidate_source::ScriptedCandidates;
    use crate::use_cases::test_support::InMemoryStore;
    use council_domain::{CandidateRejection, DoneReason, ReviewerId, SessionEvent};
    use std::sync::Mutex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    async fn run(
        store: Arc<InMemoryStore>,
        proposal: i64,
        lines: &[&str],
    ) -> Result<AssignmentOutcome, AssignReviewersError> {
        let use_case = AssignReviewersUseCase::new(store, AssignmentParams::default());
        let mut source = ScriptedCandidates::from_lines(lines);
        use_case
            .execute(
                AssignReviewersInput::new(ProposalId(proposal)).with_today(today()),
                &mut source,
                &NoAssignmentProgress,
            )
            .await
    }

    #[tokio::test]
    async fn test_assigns_until_cap() {
        let store = Arc::new(InMemoryStore::reference());
        let outcome = run(store.clone(), 1, &["4", "5", "6", "7"]).await.unwrap();

        assert_eq!(outcome.reason, DoneReason::CapReached);
        let ids: Vec<_> = outcome.committed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![ReviewerId(4), ReviewerId(5), ReviewerId(6)]);
        assert_eq!(outcome.final_count, 3);

        let rows = store.assignments_for(ProposalId(1));
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.competition.get() == 4));
        assert!(rows.iter().all(|r| !r.submitted));
        assert!(
            rows.iter()
                .all(|r| r.deadline == NaiveDate::from_ymd_opt(2024, 3, 31))
        );
    }

    #[tokio::test]
    async fn test_full_proposal_writes_nothing() {
        let store = Arc::new(InMemoryStore::reference());
        let outcome = run(store.clone(), 3, &["4"]).await.unwrap();

        assert_eq!(outcome.reason, DoneReason::CapReached);
        assert!(outcome.committed.is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_unknown_proposal_is_rejected() {
        let store = Arc::new(InMemoryStore::reference());
        let error = run(store, 999, &["4"]).await.unwrap_err();

        assert!(matches!(
            error,
            AssignReviewersError::ProposalNotFound(ProposalId(999))
        ));
        assert!(error.is_caller_error());
    }

    #[tokio::test]
    async fn test_no_eligible_reviewers() {
        let store = Arc::new(InMemoryStore::empty());
        store
            .insert_proposal(
                council_domain::NewProposal::submitted(
                    5_000.0,
                    council_domain::CompetitionId(1),
                    council_domain::ResearcherId(1),
                )
                .with_id(ProposalId(1)),
            )
            .await
            .unwrap();

        let outcome = run(store, 1, &["4"]).await.unwrap();
        assert_eq!(outcome.reason, DoneReason::NoEligibleReviewers);
        assert!(outcome.committed.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_and_ineligible_candidates_keep_session_open() {
        let store = Arc::new(InMemoryStore::reference());
        let outcome = run(store, 1, &["abc", "1", "8", "4", "4", "done"]).await.unwrap();

        assert_eq!(outcome.reason, DoneReason::Stopped);
        assert_eq!(outcome.committed.len(), 1);

        let rejections: Vec<_> = outcome
            .events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Rejected { rejection, .. } => Some(rejection.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            rejections,
            vec![
                CandidateRejection::NotAnIdentifier {
                    input: "abc".to_string()
                },
                CandidateRejection::NotEligible {
                    reviewer: ReviewerId(1)
                },
                CandidateRejection::NotEligible {
                    reviewer: ReviewerId(8)
                },
                CandidateRejection::AlreadyCommitted {
                    reviewer: ReviewerId(4)
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_and_session_continues() {
        let store = Arc::new(InMemoryStore::reference());
        store.fail_next_write(StoreError::Constraint("FOREIGN KEY constraint failed".into()));

        let outcome = run(store.clone(), 2, &["4", "4", "stop"]).await.unwrap();

        assert_eq!(outcome.failures().count(), 1);
        assert_eq!(outcome.committed.len(), 1);
        assert_eq!(store.assignments_for(ProposalId(2)).len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_aborts() {
        let store = Arc::new(InMemoryStore::reference());
        store.fail_next_write(StoreError::Unavailable("disk I/O error".into()));

        let error = run(store, 2, &["4"]).await.unwrap_err();
        assert!(matches!(error, AssignReviewersError::StoreUnavailable(_)));
        assert!(!error.is_caller_error());
    }

    #[tokio::test]
    async fn test_concurrent_fill_stops_session() {
        let store = Arc::new(InMemoryStore::reference());
        // Lands after the count read at session start.
        store.add_concurrently(ProposalId(2), &[9, 10, 3], 1);

        let outcome = run(store.clone(), 2, &["4", "5"]).await.unwrap();

        assert_eq!(outcome.reason, DoneReason::CapReached);
        assert_eq!(outcome.existing_count, 0);
        assert!(outcome.committed.is_empty());
        assert_eq!(store.writes(), 0);
        assert_eq!(store.assignments_for(ProposalId(2)).len(), 3);
    }

    #[tokio::test]
    async fn test_repeated_sessions_never_exceed_cap() {
        let store = Arc::new(InMemoryStore::reference());
        run(store.clone(), 2, &["4", "done"]).await.unwrap();
        run(store.clone(), 2, &["4", "5", "done"]).await.unwrap();
        let third = run(store.clone(), 2, &["6", "7", "9"]).await.unwrap();

        assert_eq!(third.reason, DoneReason::CapReached);
        let rows = store.assignments_for(ProposalId(2));
        assert_eq!(rows.len(), 3);

        let mut reviewers: Vec<_> = rows.iter().map(|r| r.reviewer).collect();
        reviewers.dedup();
        assert_eq!(reviewers.len(), 3);
    }

    struct RecordingProgress {
        committed: Mutex<Vec<(ReviewerId, u32)>>,
    }

    impl AssignmentProgressNotifier for RecordingProgress {
        fn on_committed(
            &self,
            reviewer: &council_domain::EligibleReviewer,
            count: u32,
            _cap: u32,
        ) {
            self.committed.lock().unwrap().push((reviewer.id, count));
        }
    }

    #[tokio::test]
    async fn test_progress_sees_running_count() {
        let store = Arc::new(InMemoryStore::reference());
        let use_case = AssignReviewersUseCase::new(store, AssignmentParams::default());
        let progress = RecordingProgress {
            committed: Mutex::new(Vec::new()),
        };
        let mut source = ScriptedCandidates::from_lines(["9", "10"]);

        use_case
            .execute(
                AssignReviewersInput::new(ProposalId(1)).with_today(today()),
                &mut source,
                &progress,
            )
            .await
            .unwrap();

        assert_eq!(
            *progress.committed.lock().unwrap(),
            vec![(ReviewerId(9), 1), (ReviewerId(10), 2)]
        );
    }

    #[tokio::test]
    async fn test_unrepresentable_deadline_aborts_before_session() {
        let store = Arc::new(InMemoryStore::reference());
        let params = AssignmentParams::default().with_review_deadline_days(u32::MAX);
        let mut source = ScriptedCandidates::from_lines(["4"]);

        let error = AssignReviewersUseCase::new(store.clone(), params)
            .execute(
                AssignReviewersInput::new(ProposalId(1)).with_today(today()),
                &mut source,
                &NoAssignmentProgress,
            )
            .await
            .unwrap_err();

        assert!(matches!(error, AssignReviewersError::Deadline(_)));
        assert!(error.is_caller_error());
        assert_eq!(store.writes(), 0);
    }
}
