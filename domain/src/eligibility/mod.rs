//! Reviewer eligibility domain.
//!
//! - [`caps::AssignmentCaps`]: per-proposal and per-reviewer limits
//! - [`snapshot`]: the proposal/reviewer snapshots the rules read
//! - [`rules`]: the pure rules ([`evaluate`], [`resolve`]) and their result types

pub mod caps;
pub mod rules;
pub mod snapshot;

pub use caps::{AssignmentCaps, DEFAULT_PER_PROPOSAL_CAP, DEFAULT_PER_REVIEWER_CAP};
pub use rules::{Eligibility, EligibleReviewer, ExcludedReviewer, Ineligibility, evaluate, resolve};
pub use snapshot::{ProposalParties, ReviewerLoad};
