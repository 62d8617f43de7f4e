//! Progress lines for assignment sessions

use colored::Colorize;
use council_application::{AssignmentProgressNotifier, StoreError};
use council_domain::{
    AssignmentOutcome, AssignmentSession, CandidateInput, CandidateRejection, EligibleReviewer,
    ReviewerId,
};

/// Prints one line per candidate to stderr, keeping stdout for the result.
pub struct ConsoleAssignmentProgress {
    quiet: bool,
}

impl ConsoleAssignmentProgress {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Suppress everything except write failures.
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl Default for ConsoleAssignmentProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentProgressNotifier for ConsoleAssignmentProgress {
    fn on_session_start(&self, session: &AssignmentSession) {
        if self.quiet {
            return;
        }
        eprintln!(
            "{} {} eligible reviewer(s) for proposal {}",
            "→".cyan(),
            session.eligibility().len(),
            session.proposal()
        );
    }

    fn on_rejected(&self, input: &CandidateInput, rejection: &CandidateRejection) {
        if self.quiet {
            return;
        }
        eprintln!("{} {}: {}", "✗".yellow(), input, rejection);
    }

    fn on_committed(&self, reviewer: &EligibleReviewer, count: u32, cap: u32) {
        if self.quiet {
            return;
        }
        eprintln!(
            "{} Assigned {} ({}) [{}/{}]",
            "✓".green(),
            reviewer.name,
            reviewer.id,
            count,
            cap
        );
    }

    fn on_write_failed(&self, reviewer: ReviewerId, error: &StoreError) {
        eprintln!(
            "{} Reviewer {} not assigned: {}",
            "✗".red().bold(),
            reviewer,
            error
        );
    }

    fn on_session_end(&self, outcome: &AssignmentOutcome) {
        if self.quiet {
            return;
        }
        eprintln!(
            "{} Session finished: {}",
            "→".cyan(),
            outcome.reason.to_string().bold()
        );
    }
}
