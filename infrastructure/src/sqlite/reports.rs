//! Report queries.
//!
//! Amount and date comparisons happen in SQL. Dates are stored as
//! `YYYY-MM-DD` text, which sorts in calendar order.

use std::str::FromStr;

use chrono::NaiveDate;
use council_domain::{
    Cell, CompetitionId, CompetitionSummary, DiscrepancyReport, Month, ProposalAmount,
    ProposalId, ResearcherId, ReviewTask, Table, TableDump,
    registry::{LARGE_PROPOSAL_AMOUNT, LARGE_PROPOSAL_COLLABORATORS},
};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{Connection, Row, params};

/// Parse a TEXT column through `FromStr`.
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

const PROPOSAL_AMOUNT_COLUMNS: &str = r#"
    p.proposal_id,
    p.competition_id,
    c.competition_title,
    c.competition_area,
    p.principle_investigator_id,
    p.proposal_status,
    p.requested_amount,
    p.awarded_amount,
    p.awarded_date
"#;

fn proposal_amount(row: &Row<'_>) -> rusqlite::Result<ProposalAmount> {
    Ok(ProposalAmount {
        proposal: ProposalId(row.get(0)?),
        competition: CompetitionId(row.get(1)?),
        competition_title: row.get(2)?,
        area: row.get(3)?,
        principal_investigator: ResearcherId(row.get(4)?),
        status: parse_column(row, 5)?,
        requested_amount: row.get(6)?,
        awarded_amount: row.get(7)?,
        awarded_date: row.get(8)?,
    })
}

pub(super) fn open_competitions(
    conn: &Connection,
    month: Month,
) -> rusqlite::Result<Vec<CompetitionSummary>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT * FROM (
            SELECT c.competition_id,
                   c.competition_number,
                   c.competition_title,
                   c.competition_area,
                   c.competition_status,
                   c.competition_deadline,
                   (SELECT COUNT(*) FROM Proposal p
                     WHERE p.competition_id = c.competition_id
                       AND (p.requested_amount > ?2
                            OR (SELECT COUNT(*) FROM ProposalCollaborator pc
                                 WHERE pc.proposal_id = p.proposal_id) > ?3)
                   ) AS large_proposals
            FROM Competition c
            WHERE c.competition_status = 'Open'
              AND strftime('%m', c.competition_deadline) = ?1
        )
        WHERE large_proposals > 0
        ORDER BY competition_id
        "#,
    )?;

    stmt.query_map(
        params![
            month.as_two_digits(),
            LARGE_PROPOSAL_AMOUNT,
            LARGE_PROPOSAL_COLLABORATORS as i64
        ],
        |row| {
            Ok(CompetitionSummary {
                id: CompetitionId(row.get(0)?),
                number: row.get(1)?,
                title: row.get(2)?,
                area: row.get(3)?,
                status: parse_column(row, 4)?,
                deadline: row.get(5)?,
                large_proposals: row.get(6)?,
            })
        },
    )?
    .collect()
}

pub(super) fn largest_requested(
    conn: &Connection,
    area: &str,
) -> rusqlite::Result<Vec<ProposalAmount>> {
    let sql = format!(
        r#"
        SELECT {PROPOSAL_AMOUNT_COLUMNS}
        FROM Proposal p
        JOIN Competition c ON c.competition_id = p.competition_id
        WHERE c.competition_area = ?1
          AND p.requested_amount = (
              SELECT MAX(p2.requested_amount)
              FROM Proposal p2
              JOIN Competition c2 ON c2.competition_id = p2.competition_id
              WHERE c2.competition_area = ?1)
        ORDER BY p.proposal_id
        "#
    );
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_map(params![area], proposal_amount)?.collect()
}

pub(super) fn largest_awarded(
    conn: &Connection,
    before: NaiveDate,
) -> rusqlite::Result<Vec<ProposalAmount>> {
    let sql = format!(
        r#"
        SELECT {PROPOSAL_AMOUNT_COLUMNS}
        FROM Proposal p
        JOIN Competition c ON c.competition_id = p.competition_id
        WHERE p.awarded_date < ?1
          AND p.awarded_amount = (
              SELECT MAX(awarded_amount) FROM Proposal WHERE awarded_date < ?1)
        ORDER BY p.proposal_id
        "#
    );
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_map(params![before], proposal_amount)?.collect()
}

pub(super) fn discrepancy(conn: &Connection, area: &str) -> rusqlite::Result<DiscrepancyReport> {
    conn.query_row(
        r#"
        SELECT AVG(ABS(p.requested_amount - p.awarded_amount)), COUNT(*)
        FROM Proposal p
        JOIN Competition c ON c.competition_id = p.competition_id
        WHERE c.competition_area = ?1
          AND p.awarded_amount IS NOT NULL
        "#,
        params![area],
        |row| {
            Ok(DiscrepancyReport {
                area: area.to_string(),
                average: row.get(0)?,
                proposals: row.get(1)?,
            })
        },
    )
}

pub(super) fn review_tasks(conn: &Connection, name: &str) -> rusqlite::Result<Vec<ReviewTask>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT p.proposal_id, c.competition_title, ra.review_deadline, ra.review_submitted
        FROM ReviewAssignment ra
        JOIN Researcher res ON res.researcher_id = ra.reviewer_id
        JOIN Proposal p ON p.proposal_id = ra.proposal_id
        JOIN Competition c ON c.competition_id = p.competition_id
        WHERE res.first_name || ' ' || res.last_name = ?1
        ORDER BY p.proposal_id
        "#,
    )?;
    stmt.query_map(params![name], |row| {
        Ok(ReviewTask {
            proposal: ProposalId(row.get(0)?),
            competition_title: row.get(1)?,
            deadline: row.get(2)?,
            submitted: row.get::<_, Option<bool>>(3)?.unwrap_or(false),
        })
    })?
    .collect()
}

fn cell(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(v) => Cell::Integer(v),
        ValueRef::Real(v) => Cell::Real(v),
        ValueRef::Text(bytes) => Cell::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Cell::Text(format!("<{} bytes>", bytes.len())),
    }
}

/// Every row of `table`. The name comes from the closed [`Table`] enum, never
/// from user text.
pub(super) fn dump_table(conn: &Connection, table: Table) -> rusqlite::Result<TableDump> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {} ORDER BY rowid", table.as_str()))?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut dump = TableDump::new(table, columns);
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            cells.push(cell(row.get_ref(idx)?));
        }
        dump.rows.push(cells);
    }
    Ok(dump)
}
