//! CLI command definitions

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use council_domain::{Month, OutputFormat, ProposalId, ReviewerId, Table};
use std::path::PathBuf;

/// CLI arguments for grant-council
#[derive(Parser, Debug)]
#[command(name = "grant-council")]
#[command(author, version, about = "Research-grant council records and reviewer assignment")]
#[command(long_about = r#"
grant-council keeps a council's competitions, proposals and reviewers in a
SQLite database, answers the council's standing reports, and assigns
reviewers to proposals without breaking conflict-of-interest or workload rules.

A reviewer is eligible for a proposal when they are not already on it, have
no declared conflict with its PI or any collaborator, and hold fewer than the
per-reviewer cap of assignments.

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables   e.g. COUNCIL_DATABASE__PATH=prod.db
2. --config <path>                   Explicit config file
3. ./council.toml                    Project-level config
4. ~/.config/grant-council/config.toml   Global config

Example:
  grant-council init
  grant-council load demos/council.json
  grant-council eligible --proposal 1 --explain
  grant-council assign --proposal 1
  grant-council largest-award --before 2024-01-01 -o json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// SQLite database file (overrides [database] path)
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Output format: table or json
    #[arg(short, long, global = true, value_name = "FORMAT")]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

/// Council operations
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create the database, or migrate it to the current schema
    Init,

    /// Insert every record of a JSON dataset
    Load {
        /// Dataset file
        file: PathBuf,
    },

    /// Open competitions due in a month that received a large proposal
    OpenCompetitions {
        /// Deadline month, 1-12
        #[arg(long)]
        month: Month,
    },

    /// Proposals requesting the most money in an area
    LargestRequest {
        #[arg(long)]
        area: String,
    },

    /// Proposals awarded the most money before a date
    LargestAward {
        /// Cutoff date, YYYY-MM-DD (exclusive)
        #[arg(long, value_name = "DATE")]
        before: NaiveDate,
    },

    /// Average gap between requested and awarded amounts in an area
    Discrepancy {
        #[arg(long)]
        area: String,
    },

    /// List reviewers eligible for a proposal
    Eligible {
        #[arg(long, value_name = "ID")]
        proposal: ProposalId,

        /// Also list excluded reviewers and why
        #[arg(long)]
        explain: bool,
    },

    /// Assign reviewers to a proposal, prompting when no --reviewer is given
    Assign {
        #[arg(long, value_name = "ID")]
        proposal: ProposalId,

        /// Reviewer to assign, in order (repeatable). Entries are checked one
        /// at a time, like prompt input; 'done' ends the session early
        #[arg(long = "reviewer", value_name = "ID")]
        reviewers: Vec<String>,
    },

    /// Replace all of a proposal's assignments in one transaction
    ReplaceAssignments {
        #[arg(long, value_name = "ID")]
        proposal: ProposalId,

        /// Reviewer for the new set (repeatable)
        #[arg(long = "reviewer", value_name = "ID", required_unless_present = "clear")]
        reviewers: Vec<ReviewerId>,

        /// Remove every assignment and add none
        #[arg(long, conflicts_with = "reviewers")]
        clear: bool,
    },

    /// Proposals assigned to a reviewer
    Reviews {
        /// Reviewer's full name, "First Last"
        #[arg(long)]
        name: String,
    },

    /// Print every row of a table
    View {
        /// One of the ten council tables, e.g. Proposal or review_assignment
        table: Table,
    },
}
