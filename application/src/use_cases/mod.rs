//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod assign_reviewers;
pub mod register_records;
pub mod replace_assignments;
pub mod resolve_eligibility;
pub mod run_report;

#[cfg(test)]
pub(crate) mod test_support;
