//! Query service
//!
//! Read-only reports over the council's records. Each report takes exactly one
//! filter; [`ReportRequest`] names the report and carries that filter so the
//! CLI can dispatch through one [`RunReportUseCase::execute`] call.

use crate::ports::council_store::{CouncilStore, StoreError};
use chrono::NaiveDate;
use council_domain::{
    CompetitionSummary, DiscrepancyReport, Month, ProposalAmount, ReviewTask, Table, TableDump,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while running a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("{0} must not be empty")]
    EmptyFilter(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ReportError {
    pub fn is_caller_error(&self) -> bool {
        match self {
            ReportError::EmptyFilter(_) => true,
            ReportError::Store(e) => e.is_caller_error(),
        }
    }
}

/// Which report to run, with its filter.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRequest {
    OpenCompetitions { month: Month },
    LargestRequest { area: String },
    LargestAward { before: NaiveDate },
    Discrepancy { area: String },
    ReviewsFor { name: String },
    ViewTable { table: Table },
}

/// Result of one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "report", content = "rows", rename_all = "snake_case")]
pub enum ReportOutput {
    OpenCompetitions(Vec<CompetitionSummary>),
    LargestRequest(Vec<ProposalAmount>),
    LargestAward(Vec<ProposalAmount>),
    Discrepancy(DiscrepancyReport),
    ReviewsFor(Vec<ReviewTask>),
    ViewTable(TableDump),
}

/// Use case for the read-only council reports.
#[derive(Clone)]
pub struct RunReportUseCase {
    store: Arc<dyn CouncilStore>,
}

impl RunReportUseCase {
    pub fn new(store: Arc<dyn CouncilStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, request: ReportRequest) -> Result<ReportOutput, ReportError> {
        debug!("Running report {:?}", request);
        Ok(match request {
            ReportRequest::OpenCompetitions { month } => ReportOutput::OpenCompetitions(
                self.open_competitions_with_large_proposals(month).await?,
            ),
            ReportRequest::LargestRequest { area } => {
                ReportOutput::LargestRequest(self.largest_requested_in_area(&area).await?)
            }
            ReportRequest::LargestAward { before } => {
                ReportOutput::LargestAward(self.largest_awarded_before(before).await?)
            }
            ReportRequest::Discrepancy { area } => {
                ReportOutput::Discrepancy(self.average_discrepancy(&area).await?)
            }
            ReportRequest::ReviewsFor { name } => {
                ReportOutput::ReviewsFor(self.proposals_to_review(&name).await?)
            }
            ReportRequest::ViewTable { table } => {
                ReportOutput::ViewTable(self.view_table(table).await?)
            }
        })
    }

    /// Open competitions with a deadline in `month` that received at least
    /// one large proposal.
    pub async fn open_competitions_with_large_proposals(
        &self,
        month: Month,
    ) -> Result<Vec<CompetitionSummary>, ReportError> {
        Ok(self
            .store
            .open_competitions_with_large_proposals(month)
            .await?)
    }

    pub async fn largest_requested_in_area(
        &self,
        area: &str,
    ) -> Result<Vec<ProposalAmount>, ReportError> {
        let area = require("area", area)?;
        Ok(self.store.largest_requested_in_area(area).await?)
    }

    pub async fn largest_awarded_before(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ProposalAmount>, ReportError> {
        Ok(self.store.largest_awarded_before(date).await?)
    }

    pub async fn average_discrepancy(&self, area: &str) -> Result<DiscrepancyReport, ReportError> {
        let area = require("area", area)?;
        Ok(self.store.discrepancy_in_area(area).await?)
    }

    pub async fn proposals_to_review(&self, name: &str) -> Result<Vec<ReviewTask>, ReportError> {
        let name = require("reviewer name", name)?;
        Ok(self.store.review_tasks(name).await?)
    }

    pub async fn view_table(&self, table: Table) -> Result<TableDump, ReportError> {
        Ok(self.store.dump_table(table).await?)
    }
}

fn require<'a>(what: &'static str, value: &'a str) -> Result<&'a str, ReportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ReportError::EmptyFilter(what))
    } else {
        Ok(trimmed)
    }
}
