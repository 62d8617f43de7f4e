//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: typed row identifiers
//! - [`month::Month`]: a validated month-of-year filter
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod ids;
pub mod month;
