//! JSON output formatter

use super::formatter::OutputFormatter;
use council_application::{LoadReport, ReplaceAssignmentsOutput, ReportOutput};
use council_domain::{AssignmentOutcome, Eligibility};
use serde::Serialize;
use serde_json::json;

/// Formats council results as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    fn render<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn report(&self, output: &ReportOutput) -> String {
        match output {
            // Column-keyed records read better than positional cells.
            ReportOutput::ViewTable(dump) => Self::render(&json!({
                "report": "view_table",
                "table": dump.table,
                "rows": dump.records(),
            })),
            other => Self::render(other),
        }
    }

    fn eligibility(&self, eligibility: &Eligibility, explain: bool) -> String {
        if explain {
            Self::render(eligibility)
        } else {
            Self::render(&json!({
                "proposal": eligibility.proposal,
                "eligible": eligibility.eligible,
            }))
        }
    }

    fn assignment_outcome(&self, outcome: &AssignmentOutcome) -> String {
        Self::render(outcome)
    }

    fn replacement(&self, output: &ReplaceAssignmentsOutput) -> String {
        Self::render(output)
    }

    fn load_report(&self, report: &LoadReport) -> String {
        Self::render(report)
    }
}
