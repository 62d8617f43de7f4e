//! Application-level configuration.
//!
//! - [`AssignmentParams`]: caps and review deadline used when writing assignments

pub mod assignment_params;

pub use assignment_params::{
    AssignmentParams, DEFAULT_REVIEW_DEADLINE_DAYS, DeadlineOutOfRange, MAX_REVIEW_DEADLINE_DAYS,
};
