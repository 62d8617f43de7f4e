//! Console output formatter for council results

use super::formatter::OutputFormatter;
use super::table;
use chrono::NaiveDate;
use colored::Colorize;
use council_application::{LoadReport, ReplaceAssignmentsOutput, ReportOutput};
use council_domain::{
    AssignmentOutcome, CompetitionSummary, DiscrepancyReport, DoneReason, Eligibility,
    ProposalAmount, ReviewTask, SessionEvent, TableDump,
};

/// Formats council results as text tables for the terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn header(title: &str) -> String {
        format!("{}\n", title.cyan().bold())
    }

    fn empty(message: &str) -> String {
        format!("{}\n", message.dimmed())
    }

    fn amount(value: f64) -> String {
        format!("{:.2}", value)
    }

    fn date(value: Option<NaiveDate>) -> String {
        value.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    }

    fn competitions(rows: &[CompetitionSummary]) -> String {
        let mut output = Self::header("Open competitions with large proposals");
        if rows.is_empty() {
            output.push_str(&Self::empty("No matching competitions."));
            return output;
        }
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.number.to_string(),
                    c.title.clone(),
                    c.area.clone().unwrap_or_default(),
                    Self::date(c.deadline),
                    c.large_proposals.to_string(),
                ]
            })
            .collect();
        output.push_str(&table::render(
            &["ID", "Number", "Title", "Area", "Deadline", "Large"],
            &rows,
        ));
        output
    }

    fn proposals(title: &str, rows: &[ProposalAmount]) -> String {
        let mut output = Self::header(title);
        if rows.is_empty() {
            output.push_str(&Self::empty("No matching proposals."));
            return output;
        }
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|p| {
                vec![
                    p.proposal.to_string(),
                    p.competition_title.clone(),
                    p.area.clone().unwrap_or_default(),
                    p.principal_investigator.to_string(),
                    p.status.to_string(),
                    Self::amount(p.requested_amount),
                    p.awarded_amount.map(Self::amount).unwrap_or_default(),
                    Self::date(p.awarded_date),
                ]
            })
            .collect();
        output.push_str(&table::render(
            &[
                "Proposal",
                "Competition",
                "Area",
                "PI",
                "Status",
                "Requested",
                "Awarded",
                "Awarded on",
            ],
            &rows,
        ));
        output
    }

    fn discrepancy(report: &DiscrepancyReport) -> String {
        let mut output = Self::header(&format!("Award discrepancy in {}", report.area));
        match report.average {
            Some(average) => output.push_str(&format!(
                "Average |requested - awarded| over {} awarded proposal(s): {}\n",
                report.proposals,
                Self::amount(average).bold()
            )),
            None => output.push_str(&Self::empty("No awarded proposals in this area.")),
        }
        output
    }

    fn review_tasks(rows: &[ReviewTask]) -> String {
        let mut output = Self::header("Proposals to review");
        if rows.is_empty() {
            output.push_str(&Self::empty("No assignments for this reviewer."));
            return output;
        }
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|t| {
                vec![
                    t.proposal.to_string(),
                    t.competition_title.clone(),
                    Self::date(t.deadline),
                    if t.submitted { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        output.push_str(&table::render(
            &["Proposal", "Competition", "Deadline", "Submitted"],
            &rows,
        ));
        output
    }

    fn dump(dump: &TableDump) -> String {
        let mut output = Self::header(dump.table.as_str());
        if dump.is_empty() {
            output.push_str(&Self::empty("(no rows)"));
            return output;
        }
        let headers: Vec<&str> = dump.columns.iter().map(String::as_str).collect();
        let rows: Vec<Vec<String>> = dump
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        output.push_str(&table::render(&headers, &rows));
        output
    }

    fn done_reason(reason: DoneReason) -> String {
        match reason {
            DoneReason::CapReached => reason.to_string().green().to_string(),
            DoneReason::NoEligibleReviewers => reason.to_string().yellow().to_string(),
            DoneReason::Stopped => reason.to_string(),
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn report(&self, output: &ReportOutput) -> String {
        match output {
            ReportOutput::OpenCompetitions(rows) => Self::competitions(rows),
            ReportOutput::LargestRequest(rows) => Self::proposals("Largest requested amount", rows),
            ReportOutput::LargestAward(rows) => Self::proposals("Largest awarded amount", rows),
            ReportOutput::Discrepancy(report) => Self::discrepancy(report),
            ReportOutput::ReviewsFor(rows) => Self::review_tasks(rows),
            ReportOutput::ViewTable(dump) => Self::dump(dump),
        }
    }

    fn eligibility(&self, eligibility: &Eligibility, explain: bool) -> String {
        let mut output = Self::header(&format!(
            "Eligible reviewers for proposal {}",
            eligibility.proposal
        ));

        if eligibility.is_empty() {
            output.push_str(&Self::empty("No eligible reviewers."));
        } else {
            let rows: Vec<Vec<String>> = eligibility
                .eligible
                .iter()
                .map(|r| vec![r.id.to_string(), r.name.clone()])
                .collect();
            output.push_str(&table::render(&["ID", "Name"], &rows));
        }

        if explain && !eligibility.excluded.is_empty() {
            output.push('\n');
            output.push_str(&Self::header("Excluded"));
            let rows: Vec<Vec<String>> = eligibility
                .excluded
                .iter()
                .map(|r| vec![r.id.to_string(), r.name.clone(), r.reason.to_string()])
                .collect();
            output.push_str(&table::render(&["ID", "Name", "Reason"], &rows));
        }

        output
    }

    fn assignment_outcome(&self, outcome: &AssignmentOutcome) -> String {
        let mut output = Self::header(&format!(
            "Assignment session for proposal {}",
            outcome.proposal
        ));
        output.push_str(&format!(
            "Finished: {}\n",
            Self::done_reason(outcome.reason)
        ));
        output.push_str(&format!(
            "Reviewers: {} before, {} after (cap {})\n",
            outcome.existing_count, outcome.final_count, outcome.cap
        ));

        if outcome.committed.is_empty() {
            output.push_str(&Self::empty("No reviewers assigned in this session."));
        } else {
            output.push_str("Assigned:\n");
            for reviewer in &outcome.committed {
                output.push_str(&format!(
                    "  {} {} ({})\n",
                    "+".green(),
                    reviewer.name,
                    reviewer.id
                ));
            }
        }

        let failures: Vec<_> = outcome.failures().collect();
        if !failures.is_empty() {
            output.push_str("Not written:\n");
            for event in failures {
                if let SessionEvent::WriteFailed { reviewer, message } = event {
                    output.push_str(&format!("  {} {}: {}\n", "x".red(), reviewer, message));
                }
            }
        }

        output
    }

    fn replacement(&self, output: &ReplaceAssignmentsOutput) -> String {
        let mut text = Self::header(&format!(
            "Assignments replaced for proposal {}",
            output.proposal
        ));
        text.push_str(&format!("Removed: {}\n", output.removed));
        if output.assigned.is_empty() {
            text.push_str(&Self::empty("No reviewers assigned."));
        } else {
            let rows: Vec<Vec<String>> = output
                .assigned
                .iter()
                .map(|r| vec![r.id.to_string(), r.name.clone()])
                .collect();
            text.push_str(&table::render(&["ID", "Name"], &rows));
        }
        text
    }

    fn load_report(&self, report: &LoadReport) -> String {
        let counts = &report.inserted;
        let mut output = Self::header("Dataset loaded");
        let rows: Vec<Vec<String>> = [
            ("Organization", counts.organizations),
            ("Researcher", counts.researchers),
            ("Competition", counts.competitions),
            ("Proposal", counts.proposals),
            ("ProposalCollaborator", counts.collaborators),
            ("Reviewer", counts.reviewers),
            ("ConflictOfInterest", counts.conflicts),
            ("ReviewAssignment", counts.assignments),
            ("Meeting", counts.meetings),
            ("MeetingParticipation", counts.participations),
        ]
        .into_iter()
        .map(|(table, count)| vec![table.to_string(), count.to_string()])
        .collect();
        output.push_str(&table::render(&["Table", "Inserted"], &rows));

        if report.duplicate_collaborators > 0 {
            output.push_str(&format!(
                "{} duplicate collaborator link(s) skipped\n",
                report.duplicate_collaborators
            ));
        }

        if !report.rejected_assignments.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", "Rejected assignments:".yellow().bold()));
            for rejection in &report.rejected_assignments {
                output.push_str(&format!(
                    "  #{}: reviewer {} on proposal {}: {}\n",
                    rejection.index, rejection.reviewer, rejection.proposal, rejection.reason
                ));
            }
        }

        output
    }
}
