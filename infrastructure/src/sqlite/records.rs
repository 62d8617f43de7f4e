//! Record inserts used by the dataset loader and `register` commands.

use council_application::ports::council_store::StoreError;
use council_domain::{
    CompetitionId, ConflictId, MeetingId, MeetingParticipation, NewCompetition, NewConflict,
    NewMeeting, NewOrganization, NewProposal, NewResearcher, OrganizationId, ProposalId,
    ResearcherId, ReviewerId,
};
use rusqlite::{Connection, params};

use super::store_error;

pub(super) fn insert_organization(
    conn: &Connection,
    organization: &NewOrganization,
) -> Result<OrganizationId, StoreError> {
    conn.execute(
        r#"
        INSERT INTO Organization (organization_id, organization_name, organization_address)
        VALUES (?1, ?2, ?3)
        "#,
        params![
            organization.id.map(OrganizationId::get),
            organization.name,
            organization.address
        ],
    )
    .map_err(|e| store_error("insert organization", e))?;
    Ok(OrganizationId(conn.last_insert_rowid()))
}

pub(super) fn insert_researcher(
    conn: &Connection,
    researcher: &NewResearcher,
) -> Result<ResearcherId, StoreError> {
    conn.execute(
        r#"
        INSERT INTO Researcher (researcher_id, first_name, last_name, email, organization_id)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            researcher.id.map(ResearcherId::get),
            researcher.first_name,
            researcher.last_name,
            researcher.email,
            researcher.organization.map(OrganizationId::get),
        ],
    )
    .map_err(|e| store_error("insert researcher", e))?;
    Ok(ResearcherId(conn.last_insert_rowid()))
}

pub(super) fn insert_competition(
    conn: &Connection,
    competition: &NewCompetition,
) -> Result<CompetitionId, StoreError> {
    conn.execute(
        r#"
        INSERT INTO Competition
            (competition_id, competition_number, competition_title, competition_description,
             competition_area, competition_status, competition_deadline)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            competition.id.map(CompetitionId::get),
            competition.number,
            competition.title,
            competition.description,
            competition.area,
            competition.status.as_str(),
            competition.deadline,
        ],
    )
    .map_err(|e| store_error("insert competition", e))?;
    Ok(CompetitionId(conn.last_insert_rowid()))
}

pub(super) fn insert_proposal(
    conn: &Connection,
    proposal: &NewProposal,
) -> Result<ProposalId, StoreError> {
    conn.execute(
        r#"
        INSERT INTO Proposal
            (proposal_id, requested_amount, competition_id, principle_investigator_id,
             proposal_status, awarded_amount, awarded_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            proposal.id.map(ProposalId::get),
            proposal.requested_amount,
            proposal.competition.get(),
            proposal.principal_investigator.get(),
            proposal.status.as_str(),
            proposal.awarded_amount,
            proposal.awarded_date,
        ],
    )
    .map_err(|e| store_error("insert proposal", e))?;
    Ok(ProposalId(conn.last_insert_rowid()))
}

/// `INSERT OR IGNORE` skips an existing pair. Foreign keys are still enforced.
pub(super) fn add_collaborator(
    conn: &Connection,
    proposal: ProposalId,
    researcher: ResearcherId,
) -> Result<bool, StoreError> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO ProposalCollaborator (proposal_id, collaborator_id) VALUES (?1, ?2)",
            params![proposal.get(), researcher.get()],
        )
        .map_err(|e| store_error("add collaborator", e))?;
    Ok(inserted > 0)
}

pub(super) fn insert_reviewer(
    conn: &Connection,
    researcher: ResearcherId,
) -> Result<ReviewerId, StoreError> {
    conn.execute(
        "INSERT INTO Reviewer (reviewer_id) VALUES (?1)",
        params![researcher.get()],
    )
    .map_err(|e| store_error("insert reviewer", e))?;
    Ok(ReviewerId(researcher.get()))
}

pub(super) fn insert_conflict(
    conn: &Connection,
    conflict: &NewConflict,
) -> Result<ConflictId, StoreError> {
    conn.execute(
        r#"
        INSERT INTO ConflictOfInterest (conflict_id, reviewer_id, conflicted_researcher_id)
        VALUES (?1, ?2, ?3)
        "#,
        params![
            conflict.id.map(ConflictId::get),
            conflict.reviewer.get(),
            conflict.conflicted_researcher.get(),
        ],
    )
    .map_err(|e| store_error("insert conflict", e))?;
    Ok(ConflictId(conn.last_insert_rowid()))
}

pub(super) fn insert_meeting(
    conn: &Connection,
    meeting: &NewMeeting,
) -> Result<MeetingId, StoreError> {
    conn.execute(
        "INSERT INTO Meeting (meeting_id, meeting_date) VALUES (?1, ?2)",
        params![meeting.id.map(MeetingId::get), meeting.date],
    )
    .map_err(|e| store_error("insert meeting", e))?;
    Ok(MeetingId(conn.last_insert_rowid()))
}

pub(super) fn add_meeting_participant(
    conn: &Connection,
    participation: &MeetingParticipation,
) -> Result<(), StoreError> {
    conn.execute(
        r#"
        INSERT INTO MeetingParticipation (meeting_id, competition_id, reviewer_id)
        VALUES (?1, ?2, ?3)
        "#,
        params![
            participation.meeting.get(),
            participation.competition.get(),
            participation.reviewer.get(),
        ],
    )
    .map_err(|e| store_error("add meeting participant", e))?;
    Ok(())
}
