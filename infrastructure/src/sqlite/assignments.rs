//! Assignment writes.
//!
//! Both writes run under `BEGIN IMMEDIATE`, so the cap counts they read cannot
//! change before the insert commits.

use council_application::ports::council_store::StoreError;
use council_domain::{AssignmentCaps, AssignmentId, NewAssignment, ProposalId, ReviewerId};
use rusqlite::{Connection, Transaction, TransactionBehavior, params};
use tracing::debug;

use super::store_error;

pub(super) fn count_for_proposal(
    conn: &Connection,
    proposal: ProposalId,
) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM ReviewAssignment WHERE proposal_id = ?1",
        params![proposal.get()],
        |row| row.get(0),
    )
}

fn count_for_reviewer(conn: &Connection, reviewer: ReviewerId) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM ReviewAssignment WHERE reviewer_id = ?1",
        params![reviewer.get()],
        |row| row.get(0),
    )
}

fn insert_row(tx: &Transaction<'_>, assignment: &NewAssignment) -> Result<i64, StoreError> {
    tx.execute(
        r#"
        INSERT INTO ReviewAssignment
            (competition_id, reviewer_id, proposal_id, review_deadline, review_submitted)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            assignment.competition.get(),
            assignment.reviewer.get(),
            assignment.proposal.get(),
            assignment.deadline,
            assignment.submitted,
        ],
    )
    .map_err(|e| store_error("insert assignment", e))?;
    Ok(tx.last_insert_rowid())
}

fn check_reviewer_capacity(
    tx: &Transaction<'_>,
    reviewer: ReviewerId,
    caps: AssignmentCaps,
) -> Result<(), StoreError> {
    let held = count_for_reviewer(tx, reviewer).map_err(|e| store_error("count reviewer", e))?;
    if caps.reviewer_has_capacity(held) {
        Ok(())
    } else {
        Err(StoreError::CapExceeded(format!(
            "reviewer {} already holds {} assignment(s), the limit is {}",
            reviewer, held, caps.per_reviewer
        )))
    }
}

/// Insert one assignment after re-checking both caps.
pub(super) fn insert_checked(
    conn: &mut Connection,
    assignment: &NewAssignment,
    caps: AssignmentCaps,
) -> Result<AssignmentId, StoreError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| store_error("begin assignment", e))?;

    let on_proposal = count_for_proposal(&tx, assignment.proposal)
        .map_err(|e| store_error("count proposal", e))?;
    if caps.proposal_is_full(on_proposal) {
        // Dropping the transaction rolls it back.
        return Err(StoreError::CapExceeded(format!(
            "proposal {} already has {} reviewer(s), the limit is {}",
            assignment.proposal, on_proposal, caps.per_proposal
        )));
    }
    check_reviewer_capacity(&tx, assignment.reviewer, caps)?;

    let id = insert_row(&tx, assignment)?;
    tx.commit().map_err(|e| store_error("commit assignment", e))?;

    debug!(
        "Assignment {} committed: reviewer {} on proposal {}",
        id, assignment.reviewer, assignment.proposal
    );
    Ok(AssignmentId(id))
}

/// Delete every assignment of `proposal` and insert `rows`, all or nothing.
pub(super) fn replace(
    conn: &mut Connection,
    proposal: ProposalId,
    rows: &[NewAssignment],
    caps: AssignmentCaps,
) -> Result<u32, StoreError> {
    if rows.len() > caps.per_proposal as usize {
        return Err(StoreError::CapExceeded(format!(
            "{} reviewers requested for proposal {}, the limit is {}",
            rows.len(),
            proposal,
            caps.per_proposal
        )));
    }
    if let Some(stray) = rows.iter().find(|row| row.proposal != proposal) {
        return Err(StoreError::Constraint(format!(
            "assignment for proposal {} passed while replacing proposal {}",
            stray.proposal, proposal
        )));
    }

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| store_error("begin replace", e))?;

    let removed = tx
        .execute(
            "DELETE FROM ReviewAssignment WHERE proposal_id = ?1",
            params![proposal.get()],
        )
        .map_err(|e| store_error("delete assignments", e))?;

    for row in rows {
        check_reviewer_capacity(&tx, row.reviewer, caps)?;
        insert_row(&tx, row)?;
    }

    tx.commit().map_err(|e| store_error("commit replace", e))?;

    debug!(
        "Replaced {} assignment(s) of proposal {} with {}",
        removed,
        proposal,
        rows.len()
    );
    Ok(u32::try_from(removed).unwrap_or(u32::MAX))
}
