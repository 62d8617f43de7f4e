//! Terminal adapters for assignment sessions

pub mod interactive;
pub mod progress;

pub use interactive::InteractiveCandidateSource;
pub use progress::ConsoleAssignmentProgress;

use council_application::{CandidateSource, ScriptedCandidates};

/// Candidates for `assign`: the `--reviewer` values in order, or the terminal
/// prompt when none were given.
///
/// Values are parsed one at a time like prompt lines, so a malformed entry is
/// rejected by the session and the entries after it still run.
pub fn candidate_source(reviewers: &[String]) -> Box<dyn CandidateSource> {
    if reviewers.is_empty() {
        Box::new(InteractiveCandidateSource::stdio())
    } else {
        Box::new(ScriptedCandidates::from_lines(reviewers))
    }
}
