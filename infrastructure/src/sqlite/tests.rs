//! Tests for the SQLite council store.

use std::sync::Arc;

use chrono::NaiveDate;
use council_application::ports::council_store::{CouncilStore, StoreError};
use council_domain::{
    AssignmentCaps, Cell, CompetitionId, CompetitionStatus, MeetingId, MeetingParticipation,
    Month, NewAssignment, NewCompetition, NewConflict, NewMeeting, NewOrganization, NewProposal,
    NewResearcher, OrganizationId, ProposalId, ResearcherId, ReviewerId, Table,
};

use super::{CURRENT_SCHEMA_VERSION, SqliteCouncilStore};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn researcher(id: i64, first: &str, last: &str) -> NewResearcher {
    NewResearcher {
        id: Some(ResearcherId(id)),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("r{}@example.org", id),
        organization: Some(OrganizationId(1)),
    }
}

fn competition(
    id: i64,
    title: &str,
    area: &str,
    status: CompetitionStatus,
    deadline: &str,
) -> NewCompetition {
    NewCompetition {
        id: Some(CompetitionId(id)),
        number: 100 + id,
        title: title.to_string(),
        description: None,
        area: Some(area.to_string()),
        status,
        deadline: Some(date(deadline)),
    }
}

fn assignment(proposal: i64, competition: i64, reviewer: i64) -> NewAssignment {
    NewAssignment {
        competition: CompetitionId(competition),
        reviewer: ReviewerId(reviewer),
        proposal: ProposalId(proposal),
        deadline: Some(date("2024-04-30")),
        submitted: false,
    }
}

/// Four competitions, five proposals, five reviewers.
///
/// - Proposal 1 (Physics, PI 1, collaborator 8) is large by amount
/// - Proposal 2 (Biology, PI 2) is large by collaborator count
/// - Proposals 3 and 4 tie for the largest Physics request
/// - Proposals 4 and 5 tie for the largest award
/// - Reviewer 7 has a conflict with researcher 1
async fn seeded_store() -> SqliteCouncilStore {
    let store = SqliteCouncilStore::new_in_memory().unwrap();

    store
        .insert_organization(NewOrganization {
            id: Some(OrganizationId(1)),
            name: "Dalhousie University".to_string(),
            address: "6299 South St, Halifax".to_string(),
        })
        .await
        .unwrap();

    for id in 1..=12 {
        let new = if id == 4 {
            researcher(4, "Ada", "Lovelace")
        } else {
            researcher(id, &format!("First{}", id), &format!("Last{}", id))
        };
        store.insert_researcher(new).await.unwrap();
    }

    for new in [
        competition(1, "Quantum Sensing", "Physics", CompetitionStatus::Open, "2024-03-15"),
        competition(2, "Soil Microbes", "Biology", CompetitionStatus::Open, "2024-03-30"),
        competition(3, "Dark Matter", "Physics", CompetitionStatus::Closed, "2024-03-01"),
        competition(4, "Coral Reefs", "Biology", CompetitionStatus::Open, "2024-07-10"),
    ] {
        store.insert_competition(new).await.unwrap();
    }

    let proposals = [
        NewProposal::submitted(25_000.0, CompetitionId(1), ResearcherId(1)).with_id(ProposalId(1)),
        NewProposal::submitted(15_000.0, CompetitionId(2), ResearcherId(2)).with_id(ProposalId(2)),
        NewProposal::submitted(50_000.0, CompetitionId(3), ResearcherId(3))
            .with_id(ProposalId(3))
            .awarded(40_000.0, date("2023-06-01")),
        NewProposal::submitted(50_000.0, CompetitionId(1), ResearcherId(5))
            .with_id(ProposalId(4))
            .awarded(45_000.0, date("2023-09-01")),
        NewProposal::submitted(30_000.0, CompetitionId(4), ResearcherId(6))
            .with_id(ProposalId(5))
            .awarded(45_000.0, date("2024-01-15")),
    ];
    for new in proposals {
        store.insert_proposal(new).await.unwrap();
    }

    store
        .add_collaborator(ProposalId(1), ResearcherId(8))
        .await
        .unwrap();
    for id in (1..=12).filter(|id| *id != 2) {
        store
            .add_collaborator(ProposalId(2), ResearcherId(id))
            .await
            .unwrap();
    }

    for id in [4, 7, 8, 9, 10] {
        store.insert_reviewer(ResearcherId(id)).await.unwrap();
    }
    store
        .insert_conflict(NewConflict {
            id: None,
            reviewer: ReviewerId(7),
            conflicted_researcher: ResearcherId(1),
        })
        .await
        .unwrap();

    store
}

// ==================== Schema ====================

#[tokio::test]
async fn test_fresh_database_is_at_current_version() {
    let store = SqliteCouncilStore::new_in_memory().unwrap();
    assert_eq!(store.schema_version().await.unwrap(), CURRENT_SCHEMA_VERSION);

    for table in Table::ALL {
        let dump = store.dump_table(table).await.unwrap();
        assert!(dump.is_empty(), "{} should start empty", table);
    }
}

#[tokio::test]
async fn test_reopen_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("council.db");

    {
        let store = SqliteCouncilStore::open(&path).unwrap();
        store
            .insert_organization(NewOrganization {
                id: None,
                name: "Acadia".to_string(),
                address: "Wolfville".to_string(),
            })
            .await
            .unwrap();
    }

    let store = SqliteCouncilStore::open(&path).unwrap();
    assert_eq!(store.schema_version().await.unwrap(), CURRENT_SCHEMA_VERSION);
    let dump = store.dump_table(Table::Organization).await.unwrap();
    assert_eq!(dump.rows.len(), 1);
}

#[tokio::test]
async fn test_newer_schema_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("council.db");
    {
        let store = SqliteCouncilStore::open(&path).unwrap();
        let conn = store.conn.lock().unwrap();
        conn.execute("UPDATE schema_version SET version = 99 WHERE id = 1", [])
            .unwrap();
    }

    let error = SqliteCouncilStore::open(&path).err().unwrap();
    assert!(matches!(error, StoreError::Storage { .. }));
}

#[test]
fn test_unopenable_path_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"").unwrap();

    let error = SqliteCouncilStore::open(blocker.join("council.db"))
        .err()
        .unwrap();
    assert!(error.is_fatal(), "got {:?}", error);
}

// ==================== Constraints ====================

#[tokio::test]
async fn test_award_trigger_rejects_unawarded_amounts() {
    let store = seeded_store().await;
    let mut proposal = NewProposal::submitted(10_000.0, CompetitionId(1), ResearcherId(3));
    proposal.awarded_amount = Some(5_000.0);

    let error = store.insert_proposal(proposal).await.unwrap_err();
    match error {
        StoreError::Constraint(message) => assert!(message.contains("awarded")),
        other => panic!("expected constraint error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_schema_constraints_are_caller_errors() {
    let store = seeded_store().await;

    // Duplicate email
    let mut duplicate = researcher(50, "Dup", "Licate");
    duplicate.email = "r1@example.org".to_string();
    let error = store.insert_researcher(duplicate).await.unwrap_err();
    assert!(matches!(error, StoreError::Constraint(_)));

    // Non-positive requested amount
    let error = store
        .insert_proposal(NewProposal::submitted(0.0, CompetitionId(1), ResearcherId(3)))
        .await
        .unwrap_err();
    assert!(error.is_caller_error());

    // Unknown competition
    let error = store
        .insert_proposal(NewProposal::submitted(10.0, CompetitionId(77), ResearcherId(3)))
        .await
        .unwrap_err();
    assert!(matches!(error, StoreError::Constraint(_)));

    // Reviewer role for a researcher that does not exist
    let error = store.insert_reviewer(ResearcherId(404)).await.unwrap_err();
    assert!(matches!(error, StoreError::Constraint(_)));
}

#[tokio::test]
async fn test_duplicate_collaborator_is_reported() {
    let store = seeded_store().await;
    assert!(
        !store
            .add_collaborator(ProposalId(1), ResearcherId(8))
            .await
            .unwrap()
    );
    assert!(
        store
            .add_collaborator(ProposalId(1), ResearcherId(9))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_meeting_participation() {
    let store = seeded_store().await;
    let meeting = store
        .insert_meeting(NewMeeting {
            id: None,
            date: Some(date("2024-05-02")),
        })
        .await
        .unwrap();
    let participation = MeetingParticipation {
        meeting,
        competition: CompetitionId(1),
        reviewer: ReviewerId(4),
    };
    store
        .add_meeting_participant(participation.clone())
        .await
        .unwrap();

    let error = store
        .add_meeting_participant(participation)
        .await
        .unwrap_err();
    assert!(matches!(error, StoreError::Constraint(_)));

    let error = store
        .add_meeting_participant(MeetingParticipation {
            meeting: MeetingId(meeting.get() + 1),
            competition: CompetitionId(1),
            reviewer: ReviewerId(4),
        })
        .await
        .unwrap_err();
    assert!(matches!(error, StoreError::Constraint(_)));
}

// ==================== Eligibility reads ====================

#[tokio::test]
async fn test_proposal_parties() {
    let store = seeded_store().await;

    let parties = store
        .proposal_parties(ProposalId(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(parties.competition, CompetitionId(1));
    assert_eq!(parties.principal_investigator, ResearcherId(1));
    assert!(parties.involves(ResearcherId(8)));

    assert!(
        store
            .proposal_parties(ProposalId(99))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_reviewer_loads_carry_names_counts_and_conflicts() {
    let store = seeded_store().await;
    let caps = AssignmentCaps::default();
    store
        .insert_assignment(assignment(4, 1, 9), caps)
        .await
        .unwrap();
    store
        .insert_assignment(assignment(1, 1, 9), caps)
        .await
        .unwrap();

    let loads = store.reviewer_loads(ProposalId(1)).await.unwrap();
    let ids: Vec<_> = loads.iter().map(|l| l.reviewer.get()).collect();
    assert_eq!(ids, vec![4, 7, 8, 9, 10]);

    let ada = &loads[0];
    assert_eq!(ada.name, "Ada Lovelace");
    assert_eq!(ada.total_assignments, 0);

    let conflicted = &loads[1];
    assert!(conflicted.conflicts.contains(&ResearcherId(1)));

    let busy = &loads[3];
    assert_eq!(busy.total_assignments, 2);
    assert_eq!(busy.assignments_on_proposal, 1);
}

// ==================== Assignment writes ====================

#[tokio::test]
async fn test_insert_rechecks_proposal_cap() {
    let store = seeded_store().await;
    let caps = AssignmentCaps::new(2, 5);

    store
        .insert_assignment(assignment(1, 1, 4), caps)
        .await
        .unwrap();
    store
        .insert_assignment(assignment(1, 1, 9), caps)
        .await
        .unwrap();
    let error = store
        .insert_assignment(assignment(1, 1, 10), caps)
        .await
        .unwrap_err();

    assert!(matches!(error, StoreError::CapExceeded(_)));
    assert_eq!(store.assignment_count(ProposalId(1)).await.unwrap(), 2);
}

#[tokio::test]
async fn test_insert_rechecks_reviewer_cap() {
    let store = seeded_store().await;
    let caps = AssignmentCaps::new(3, 1);

    store
        .insert_assignment(assignment(1, 1, 4), caps)
        .await
        .unwrap();
    let error = store
        .insert_assignment(assignment(4, 1, 4), caps)
        .await
        .unwrap_err();

    assert!(matches!(error, StoreError::CapExceeded(_)));
    assert_eq!(store.assignment_count(ProposalId(4)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_same_pair_twice_is_a_constraint() {
    let store = seeded_store().await;
    let caps = AssignmentCaps::default();
    store
        .insert_assignment(assignment(1, 1, 4), caps)
        .await
        .unwrap();

    let error = store
        .insert_assignment(assignment(1, 1, 4), caps)
        .await
        .unwrap_err();
    assert!(matches!(error, StoreError::Constraint(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_connections_cannot_overfill_a_proposal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("council.db");
    {
        let store = SqliteCouncilStore::open(&path).unwrap();
        store
            .insert_organization(NewOrganization {
                id: Some(OrganizationId(1)),
                name: "Acadia".to_string(),
                address: "Wolfville".to_string(),
            })
            .await
            .unwrap();
        for id in 1..=8 {
            store
                .insert_researcher(researcher(id, "R", &id.to_string()))
                .await
                .unwrap();
        }
        store
            .insert_competition(competition(
                1,
                "Quantum Sensing",
                "Physics",
                CompetitionStatus::Open,
                "2024-03-15",
            ))
            .await
            .unwrap();
        store
            .insert_proposal(
                NewProposal::submitted(1_000.0, CompetitionId(1), ResearcherId(1))
                    .with_id(ProposalId(1)),
            )
            .await
            .unwrap();
        for id in 2..=8 {
            store.insert_reviewer(ResearcherId(id)).await.unwrap();
        }
    }

    let first = Arc::new(SqliteCouncilStore::open(&path).unwrap());
    let second = Arc::new(SqliteCouncilStore::open(&path).unwrap());
    let caps = AssignmentCaps::new(3, 5);

    let mut handles = Vec::new();
    for reviewer in 2..=8 {
        let store = if reviewer % 2 == 0 {
            first.clone()
        } else {
            second.clone()
        };
        handles.push(tokio::spawn(async move {
            store.insert_assignment(assignment(1, 1, reviewer), caps).await
        }));
    }

    let mut committed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(StoreError::CapExceeded(_)) => {}
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    assert_eq!(committed, 3);
    assert_eq!(first.assignment_count(ProposalId(1)).await.unwrap(), 3);
}

#[tokio::test]
async fn test_replace_swaps_the_whole_set() {
    let store = seeded_store().await;
    let caps = AssignmentCaps::default();
    for reviewer in [4, 9] {
        store
            .insert_assignment(assignment(1, 1, reviewer), caps)
            .await
            .unwrap();
    }

    let removed = store
        .replace_assignments(ProposalId(1), vec![assignment(1, 1, 10)], caps)
        .await
        .unwrap();

    assert_eq!(removed, 2);
    let loads = store.reviewer_loads(ProposalId(1)).await.unwrap();
    let on_proposal: Vec<_> = loads
        .iter()
        .filter(|l| l.assignments_on_proposal > 0)
        .map(|l| l.reviewer.get())
        .collect();
    assert_eq!(on_proposal, vec![10]);
}

#[tokio::test]
async fn test_replace_is_all_or_nothing() {
    let store = seeded_store().await;
    let caps = AssignmentCaps::new(3, 1);
    store
        .insert_assignment(assignment(1, 1, 4), caps)
        .await
        .unwrap();
    // Reviewer 9 is at the per-reviewer cap through proposal 4.
    store
        .insert_assignment(assignment(4, 1, 9), caps)
        .await
        .unwrap();

    let error = store
        .replace_assignments(
            ProposalId(1),
            vec![assignment(1, 1, 10), assignment(1, 1, 9)],
            caps,
        )
        .await
        .unwrap_err();

    assert!(matches!(error, StoreError::CapExceeded(_)));
    let dump = store.dump_table(Table::ReviewAssignment).await.unwrap();
    assert_eq!(dump.rows.len(), 2);
    let loads = store.reviewer_loads(ProposalId(1)).await.unwrap();
    assert_eq!(loads[0].assignments_on_proposal, 1);
}

// ==================== Reports ====================

#[tokio::test]
async fn test_open_competitions_with_large_proposals() {
    let store = seeded_store().await;

    let march = store
        .open_competitions_with_large_proposals(Month::try_new(3).unwrap())
        .await
        .unwrap();
    let rows: Vec<_> = march
        .iter()
        .map(|c| (c.id.get(), c.large_proposals))
        .collect();
    // Competition 3 is closed.
    assert_eq!(rows, vec![(1, 2), (2, 1)]);

    let july = store
        .open_competitions_with_large_proposals(Month::try_new(7).unwrap())
        .await
        .unwrap();
    assert_eq!(july.len(), 1);
    assert_eq!(july[0].title, "Coral Reefs");

    assert!(
        store
            .open_competitions_with_large_proposals(Month::try_new(12).unwrap())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_large_proposal_thresholds_are_strict() {
    let store = seeded_store().await;
    let may = Month::try_new(5).unwrap();
    store
        .insert_competition(competition(
            5,
            "Tidal Power",
            "Engineering",
            CompetitionStatus::Open,
            "2024-05-20",
        ))
        .await
        .unwrap();

    // Exactly at both thresholds: not large.
    store
        .insert_proposal(
            NewProposal::submitted(20_000.0, CompetitionId(5), ResearcherId(3))
                .with_id(ProposalId(6)),
        )
        .await
        .unwrap();
    for id in (1..=12).filter(|id| *id != 3 && *id != 4) {
        store
            .add_collaborator(ProposalId(6), ResearcherId(id))
            .await
            .unwrap();
    }
    assert!(
        store
            .open_competitions_with_large_proposals(may)
            .await
            .unwrap()
            .is_empty()
    );

    // One more collaborator tips it over.
    store
        .add_collaborator(ProposalId(6), ResearcherId(4))
        .await
        .unwrap();
    let rows = store.open_competitions_with_large_proposals(may).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].large_proposals, 1);
}

#[tokio::test]
async fn test_largest_request_includes_ties() {
    let store = seeded_store().await;

    let physics = store.largest_requested_in_area("Physics").await.unwrap();
    let ids: Vec<_> = physics.iter().map(|p| p.proposal.get()).collect();
    assert_eq!(ids, vec![3, 4]);
    assert_eq!(physics[0].requested_amount, 50_000.0);

    assert!(
        store
            .largest_requested_in_area("Chemistry")
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_largest_award_before_is_strict() {
    let store = seeded_store().await;

    let before_2024 = store
        .largest_awarded_before(date("2024-01-01"))
        .await
        .unwrap();
    let ids: Vec<_> = before_2024.iter().map(|p| p.proposal.get()).collect();
    assert_eq!(ids, vec![4]);

    let tie = store
        .largest_awarded_before(date("2024-02-01"))
        .await
        .unwrap();
    let ids: Vec<_> = tie.iter().map(|p| p.proposal.get()).collect();
    assert_eq!(ids, vec![4, 5]);

    // Awarded on 2023-06-01 exactly, so not strictly before.
    assert!(
        store
            .largest_awarded_before(date("2023-06-01"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_discrepancy() {
    let store = seeded_store().await;

    let physics = store.discrepancy_in_area("Physics").await.unwrap();
    assert_eq!(physics.average, Some(7_500.0));
    assert_eq!(physics.proposals, 2);

    let biology = store.discrepancy_in_area("Biology").await.unwrap();
    assert_eq!(biology.average, Some(15_000.0));

    let chemistry = store.discrepancy_in_area("Chemistry").await.unwrap();
    assert_eq!(chemistry.average, None);
    assert_eq!(chemistry.proposals, 0);
}

#[tokio::test]
async fn test_review_tasks_match_full_name_exactly() {
    let store = seeded_store().await;
    let caps = AssignmentCaps::default();
    store
        .insert_assignment(assignment(4, 1, 4), caps)
        .await
        .unwrap();
    store
        .insert_assignment(assignment(1, 1, 4), caps)
        .await
        .unwrap();

    let tasks = store.review_tasks("Ada Lovelace").await.unwrap();
    let ids: Vec<_> = tasks.iter().map(|t| t.proposal.get()).collect();
    assert_eq!(ids, vec![1, 4]);
    assert_eq!(tasks[0].competition_title, "Quantum Sensing");
    assert_eq!(tasks[0].deadline, Some(date("2024-04-30")));
    assert!(!tasks[0].submitted);

    assert!(store.review_tasks("Ada").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_dump_table_keeps_schema_columns() {
    let store = seeded_store().await;

    let dump = store.dump_table(Table::Proposal).await.unwrap();
    assert_eq!(
        dump.columns,
        vec![
            "proposal_id",
            "requested_amount",
            "competition_id",
            "principle_investigator_id",
            "proposal_status",
            "awarded_amount",
            "awarded_date",
        ]
    );
    assert_eq!(dump.rows.len(), 5);
    assert_eq!(dump.rows[0][0], Cell::Integer(1));
    assert_eq!(dump.rows[0][4], Cell::Text("Submitted".to_string()));
    assert_eq!(dump.rows[0][5], Cell::Null);
    assert_eq!(dump.rows[2][6], Cell::Text("2023-06-01".to_string()));
}
