//! Presentation layer for grant-council
//!
//! This crate contains CLI definitions, output formatters, and the terminal
//! adapters for interactive reviewer assignment.

pub mod assignment;
pub mod cli;
pub mod config;
pub mod output;

// Re-export commonly used types
pub use assignment::{ConsoleAssignmentProgress, InteractiveCandidateSource, candidate_source};
pub use cli::commands::{Cli, Command};
pub use config::OutputConfig;
pub use output::{ConsoleFormatter, JsonFormatter, OutputFormatter, formatter_for};
