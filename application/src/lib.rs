//! Application layer for grant-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::AssignmentParams;
pub use ports::{
    assignment_progress::{AssignmentProgressNotifier, NoAssignmentProgress},
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    candidate_source::{CandidateSource, CandidateSourceError, ScriptedCandidates},
    council_store::{CouncilStore, StoreError},
};
pub use use_cases::assign_reviewers::{
    AssignReviewersError, AssignReviewersInput, AssignReviewersUseCase,
};
pub use use_cases::register_records::{
    CollaboratorLink, Dataset, InsertedCounts, LoadReport, RegisterError, RegisterRecordsUseCase,
    SeedRejection,
};
pub use use_cases::replace_assignments::{
    ReplaceAssignmentsError, ReplaceAssignmentsInput, ReplaceAssignmentsOutput,
    ReplaceAssignmentsUseCase,
};
pub use use_cases::resolve_eligibility::{ResolveEligibilityError, ResolveEligibilityUseCase};
pub use use_cases::run_report::{ReportError, ReportOutput, ReportRequest, RunReportUseCase};
