//! Read-only report rows produced by the query service
//!
//! These are plain value objects. The store fills them in; the presentation
//! layer renders them as text tables or JSON.

use crate::core::ids::{CompetitionId, ProposalId, ResearcherId};
use crate::registry::{CompetitionStatus, ProposalStatus, Table};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An open competition that attracted at least one large proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionSummary {
    pub id: CompetitionId,
    pub number: i64,
    pub title: String,
    pub area: Option<String>,
    pub status: CompetitionStatus,
    pub deadline: Option<NaiveDate>,
    /// Proposals above the amount threshold or with many collaborators
    pub large_proposals: u32,
}

/// A proposal together with the competition it was submitted to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalAmount {
    pub proposal: ProposalId,
    pub competition: CompetitionId,
    pub competition_title: String,
    pub area: Option<String>,
    pub principal_investigator: ResearcherId,
    pub status: ProposalStatus,
    pub requested_amount: f64,
    pub awarded_amount: Option<f64>,
    pub awarded_date: Option<NaiveDate>,
}

/// Mean |requested - awarded| over the awarded proposals of one area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyReport {
    pub area: String,
    /// `None` when no proposal in the area has an awarded amount
    pub average: Option<f64>,
    pub proposals: u32,
}

/// A proposal a reviewer has been asked to review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewTask {
    pub proposal: ProposalId,
    pub competition_title: String,
    pub deadline: Option<NaiveDate>,
    pub submitted: bool,
}

/// One cell of a table dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Real(v) => write!(f, "{}", v),
            Cell::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Every row of one table, in primary-key order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDump {
    pub table: Table,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TableDump {
    pub fn new(table: Table, columns: Vec<String>) -> Self {
        Self {
            table,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as `column -> value` maps, for JSON output.
    pub fn records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|cell| match cell {
                        Cell::Null => serde_json::Value::Null,
                        Cell::Integer(v) => serde_json::Value::from(*v),
                        Cell::Real(v) => serde_json::Value::from(*v),
                        Cell::Text(v) => serde_json::Value::from(v.as_str()),
                    }))
                    .collect()
            })
            .collect()
    }
}
