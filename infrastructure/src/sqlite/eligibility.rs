//! Reads behind the eligibility resolver.

use std::collections::{BTreeMap, BTreeSet};

use council_application::ports::council_store::StoreError;
use council_domain::{
    CompetitionId, ProposalId, ProposalParties, ResearcherId, ReviewerId, ReviewerLoad,
    registry::full_name,
};
use rusqlite::{Connection, OptionalExtension, params};

use super::store_error;

pub(super) fn proposal_parties(
    conn: &mut Connection,
    proposal: ProposalId,
) -> Result<Option<ProposalParties>, StoreError> {
    let tx = conn
        .transaction()
        .map_err(|e| store_error("proposal parties", e))?;

    let header: Option<(i64, i64)> = tx
        .query_row(
            "SELECT competition_id, principle_investigator_id FROM Proposal WHERE proposal_id = ?1",
            params![proposal.get()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| store_error("proposal parties", e))?;

    let Some((competition, principal_investigator)) = header else {
        return Ok(None);
    };

    let collaborators = {
        let mut stmt = tx
            .prepare(
                "SELECT collaborator_id FROM ProposalCollaborator WHERE proposal_id = ?1 \
                 ORDER BY collaborator_id",
            )
            .map_err(|e| store_error("proposal parties", e))?;
        stmt.query_map(params![proposal.get()], |row| {
            row.get::<_, i64>(0).map(ResearcherId)
        })
        .and_then(|rows| rows.collect::<Result<BTreeSet<_>, _>>())
        .map_err(|e| store_error("proposal parties", e))?
    };

    tx.commit().map_err(|e| store_error("proposal parties", e))?;

    Ok(Some(
        ProposalParties::new(
            proposal,
            CompetitionId(competition),
            ResearcherId(principal_investigator),
        )
        .with_collaborators(collaborators),
    ))
}

/// Every reviewer with counts and conflicts, read in one transaction so the
/// snapshot is consistent.
pub(super) fn reviewer_loads(
    conn: &mut Connection,
    proposal: ProposalId,
) -> Result<Vec<ReviewerLoad>, StoreError> {
    let tx = conn
        .transaction()
        .map_err(|e| store_error("reviewer loads", e))?;

    let mut conflicts: BTreeMap<i64, BTreeSet<ResearcherId>> = BTreeMap::new();
    {
        let mut stmt = tx
            .prepare("SELECT reviewer_id, conflicted_researcher_id FROM ConflictOfInterest")
            .map_err(|e| store_error("reviewer loads", e))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|e| store_error("reviewer loads", e))?;
        for row in rows {
            let (reviewer, researcher) = row.map_err(|e| store_error("reviewer loads", e))?;
            conflicts
                .entry(reviewer)
                .or_default()
                .insert(ResearcherId(researcher));
        }
    }

    let loads = {
        let mut stmt = tx
            .prepare(
                r#"
                SELECT r.reviewer_id,
                       res.first_name,
                       res.last_name,
                       (SELECT COUNT(*) FROM ReviewAssignment ra
                         WHERE ra.reviewer_id = r.reviewer_id),
                       (SELECT COUNT(*) FROM ReviewAssignment ra
                         WHERE ra.reviewer_id = r.reviewer_id AND ra.proposal_id = ?1)
                FROM Reviewer r
                JOIN Researcher res ON res.researcher_id = r.reviewer_id
                ORDER BY r.reviewer_id
                "#,
            )
            .map_err(|e| store_error("reviewer loads", e))?;
        stmt.query_map(params![proposal.get()], |row| {
            let id: i64 = row.get(0)?;
            let first: String = row.get(1)?;
            let last: String = row.get(2)?;
            let total: u32 = row.get(3)?;
            let on_proposal: u32 = row.get(4)?;
            Ok((id, full_name(&first, &last), total, on_proposal))
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(|e| store_error("reviewer loads", e))?
    };

    tx.commit().map_err(|e| store_error("reviewer loads", e))?;

    Ok(loads
        .into_iter()
        .map(|(id, name, total, on_proposal)| {
            ReviewerLoad::new(ReviewerId(id), name)
                .with_assignments(total, on_proposal)
                .with_conflicts(conflicts.remove(&id).unwrap_or_default())
        })
        .collect())
}
