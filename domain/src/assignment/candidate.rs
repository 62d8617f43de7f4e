//! Candidate input fed into an assignment session

use crate::core::ids::ReviewerId;
use serde::{Deserialize, Serialize};

/// Tokens that end the selection loop.
pub const STOP_TOKENS: [&str; 5] = ["done", "stop", "q", "quit", "/done"];

/// One event from whoever is choosing reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CandidateInput {
    /// A reviewer id to assign
    Reviewer(ReviewerId),
    /// The caller is finished choosing
    Stop,
    /// Text that is neither a reviewer id nor a stop token
    Malformed(String),
}

impl CandidateInput {
    /// Parse one line of candidate input.
    ///
    /// ```
    /// use council_domain::assignment::CandidateInput;
    /// use council_domain::ReviewerId;
    ///
    /// assert_eq!(CandidateInput::parse(" 4 "), CandidateInput::Reviewer(ReviewerId(4)));
    /// assert_eq!(CandidateInput::parse("DONE"), CandidateInput::Stop);
    /// assert!(matches!(CandidateInput::parse("abc"), CandidateInput::Malformed(_)));
    /// ```
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let lowered = trimmed.to_lowercase();
        if STOP_TOKENS.contains(&lowered.as_str()) {
            return CandidateInput::Stop;
        }

        match trimmed.parse::<ReviewerId>() {
            Ok(id) if id.get() > 0 => CandidateInput::Reviewer(id),
            _ => CandidateInput::Malformed(trimmed.to_string()),
        }
    }
}

impl std::fmt::Display for CandidateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateInput::Reviewer(id) => write!(f, "{}", id),
            CandidateInput::Stop => write!(f, "done"),
            CandidateInput::Malformed(text) => write!(f, "{}", text),
        }
    }
}
