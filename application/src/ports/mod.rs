//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod assignment_progress;
pub mod audit_logger;
pub mod candidate_source;
pub mod council_store;
