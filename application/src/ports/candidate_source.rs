//! Candidate source port for assignment sessions.
//!
//! An assignment session asks a [`CandidateSource`] for one reviewer at a time
//! until the proposal is full or the source says stop.
//!
//! # Architecture
//!
//! - **Port**: [`CandidateSource`] - defined here in application layer
//! - **Adapter**: `InteractiveCandidateSource` - terminal prompt in presentation layer
//!
//! # Built-in Implementations
//!
//! - [`ScriptedCandidates`] - replays a fixed list, then stops

use async_trait::async_trait;
use council_domain::{AssignmentSession, CandidateInput};
use std::collections::VecDeque;

/// Error type for candidate sources.
///
/// These are failures to obtain input, not rejected candidates.
#[derive(Debug, Clone)]
pub enum CandidateSourceError {
    /// Input ended (e.g. end of file on stdin).
    Closed,
    /// Input/output error (e.g., terminal read failure).
    IoError(String),
}

impl std::fmt::Display for CandidateSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateSourceError::Closed => write!(f, "Input closed"),
            CandidateSourceError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for CandidateSourceError {}

/// Port for supplying reviewer candidates to an assignment session.
#[async_trait]
pub trait CandidateSource: Send {
    /// Produce the next candidate.
    ///
    /// `session` shows the reviewers still available and the open slots, so
    /// an interactive source can display them.
    async fn next_candidate(
        &mut self,
        session: &AssignmentSession,
    ) -> Result<CandidateInput, CandidateSourceError>;
}

/// Replays a fixed list of candidate inputs, then stops.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCandidates {
    inputs: VecDeque<CandidateInput>,
}

impl ScriptedCandidates {
    /// Parse each line with [`CandidateInput::parse`].
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            inputs: lines
                .into_iter()
                .map(|line| CandidateInput::parse(line.as_ref()))
                .collect(),
        }
    }

    pub fn new(inputs: impl IntoIterator<Item = CandidateInput>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

#[async_trait]
impl CandidateSource for ScriptedCandidates {
    async fn next_candidate(
        &mut self,
        _session: &AssignmentSession,
    ) -> Result<CandidateInput, CandidateSourceError> {
        Ok(self.inputs.pop_front().unwrap_or(CandidateInput::Stop))
    }
}
