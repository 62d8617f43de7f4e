//! Output formatter trait

use super::{ConsoleFormatter, JsonFormatter};
use council_application::{LoadReport, ReplaceAssignmentsOutput, ReportOutput};
use council_domain::{AssignmentOutcome, Eligibility, OutputFormat};

/// Trait for rendering command results
pub trait OutputFormatter {
    /// Format the result of one report
    fn report(&self, output: &ReportOutput) -> String;

    /// Format an eligibility result, with exclusion reasons when `explain` is set
    fn eligibility(&self, eligibility: &Eligibility, explain: bool) -> String;

    /// Format the summary of a finished assignment session
    fn assignment_outcome(&self, outcome: &AssignmentOutcome) -> String;

    /// Format the result of a batch replacement
    fn replacement(&self, output: &ReplaceAssignmentsOutput) -> String;

    /// Format the result of a dataset load
    fn load_report(&self, report: &LoadReport) -> String;
}

/// The formatter for an output format.
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Table => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
