//! SQLite implementation of [`CouncilStore`].
//!
//! The schema uses the council's established table and column names, so an
//! existing `council.db` can be opened directly.
//!
//! # Schema Versioning
//!
//! A `schema_version` table records which migrations have run. To change the
//! schema, increment [`CURRENT_SCHEMA_VERSION`] and add a step to
//! `run_migrations()`. Steps run in order from the stored version up.
//!
//! # Concurrency
//!
//! rusqlite is synchronous, so every operation runs on the blocking pool via
//! `tokio::task::spawn_blocking`. Writes that re-check an assignment cap open
//! the transaction with `BEGIN IMMEDIATE`; the write lock is held from the
//! count to the insert, so two sessions cannot both take the last slot.

mod assignments;
mod eligibility;
mod records;
mod reports;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use council_application::ports::council_store::{CouncilStore, StoreError};
use council_domain::{
    AssignmentCaps, AssignmentId, CompetitionId, CompetitionSummary, ConflictId,
    DiscrepancyReport, MeetingId, MeetingParticipation, Month, NewAssignment, NewCompetition,
    NewConflict, NewMeeting, NewOrganization, NewProposal, NewResearcher, OrganizationId,
    ProposalAmount, ProposalId, ProposalParties, ResearcherId, ReviewTask, ReviewerId,
    ReviewerLoad, Table, TableDump,
};
use rusqlite::{Connection, ErrorCode, OptionalExtension};
use tracing::{debug, warn};

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// SQLite-backed council store.
pub struct SqliteCouncilStore {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl SqliteCouncilStore {
    /// Open (or create) the database at `path` and bring its schema up to date.
    ///
    /// # Pragmas
    ///
    /// - `journal_mode = WAL` so readers do not block the assignment writer
    /// - `synchronous = NORMAL`
    /// - `busy_timeout = 5000ms` so a second process waits for the write lock
    /// - `foreign_keys = ON`, which SQLite leaves off per connection
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy();
        let is_in_memory = path_str == ":memory:";

        if !is_in_memory
            && let Some(parent) = path_ref.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!(
                    "cannot create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path_ref).map_err(|e| {
            StoreError::Unavailable(format!("cannot open {}: {}", path_ref.display(), e))
        })?;

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(|e| store_error("set journal_mode", e))?;
        let journal_mode_ok = journal_mode.eq_ignore_ascii_case("wal")
            || (is_in_memory && journal_mode.eq_ignore_ascii_case("memory"));
        if !journal_mode_ok {
            warn!(
                "SQLite kept journal_mode '{}' for {}; concurrent sessions will serialize",
                journal_mode,
                path_ref.display()
            );
        }

        conn.execute_batch(
            r#"
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            PRAGMA foreign_keys = ON;
            "#,
        )
        .map_err(|e| store_error("configure pragmas", e))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| store_error("create schema_version table", e))?;

        let current_version: i64 = conn
            .query_row(
                "SELECT version FROM schema_version WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| store_error("get schema version", e))?
            .unwrap_or(0);

        Self::run_migrations(&conn, current_version)?;
        debug!(
            "Opened council store at {} (schema v{})",
            path_ref.display(),
            CURRENT_SCHEMA_VERSION
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory database, mainly for tests.
    pub fn new_in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    /// Schema version currently recorded in the database.
    pub async fn schema_version(&self) -> Result<i64, StoreError> {
        self.run("schema version", |conn| {
            conn.query_row(
                "SELECT version FROM schema_version WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .map_err(|e| store_error("schema version", e))
        })
        .await
    }

    fn run_migrations(conn: &Connection, from_version: i64) -> Result<(), StoreError> {
        if from_version > CURRENT_SCHEMA_VERSION {
            return Err(StoreError::storage(
                "schema version",
                format!(
                    "Database schema version {} is newer than supported version {}. \
                     Please upgrade grant-council.",
                    from_version, CURRENT_SCHEMA_VERSION
                ),
            ));
        }

        if from_version == CURRENT_SCHEMA_VERSION {
            return Ok(());
        }

        // Version 1: the ten council tables and the award trigger
        if from_version < 1 {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS Organization (
                    organization_id INTEGER PRIMARY KEY,
                    organization_name TEXT NOT NULL,
                    organization_address TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS Researcher (
                    researcher_id INTEGER PRIMARY KEY,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    email TEXT UNIQUE NOT NULL,
                    organization_id INTEGER,
                    FOREIGN KEY (organization_id) REFERENCES Organization(organization_id)
                );

                CREATE TABLE IF NOT EXISTS Competition (
                    competition_id INTEGER PRIMARY KEY,
                    competition_number INTEGER UNIQUE NOT NULL,
                    competition_title TEXT NOT NULL,
                    competition_description TEXT,
                    competition_area TEXT,
                    competition_status TEXT NOT NULL
                        CHECK (competition_status IN ('Open', 'Closed')),
                    competition_deadline DATE
                );

                CREATE TABLE IF NOT EXISTS Proposal (
                    proposal_id INTEGER PRIMARY KEY,
                    requested_amount REAL NOT NULL CHECK (requested_amount > 0),
                    competition_id INTEGER NOT NULL,
                    principle_investigator_id INTEGER NOT NULL,
                    proposal_status TEXT NOT NULL
                        CHECK (proposal_status IN ('Submitted', 'Awarded', 'Not Awarded')),
                    awarded_amount REAL,
                    awarded_date DATE,
                    FOREIGN KEY (competition_id) REFERENCES Competition(competition_id)
                        ON DELETE CASCADE,
                    FOREIGN KEY (principle_investigator_id) REFERENCES Researcher(researcher_id)
                );

                CREATE TABLE IF NOT EXISTS ProposalCollaborator (
                    proposal_id INTEGER NOT NULL,
                    collaborator_id INTEGER NOT NULL,
                    PRIMARY KEY (proposal_id, collaborator_id),
                    FOREIGN KEY (proposal_id) REFERENCES Proposal(proposal_id) ON DELETE CASCADE,
                    FOREIGN KEY (collaborator_id) REFERENCES Researcher(researcher_id)
                );

                CREATE TABLE IF NOT EXISTS Reviewer (
                    reviewer_id INTEGER PRIMARY KEY,
                    FOREIGN KEY (reviewer_id) REFERENCES Researcher(researcher_id)
                );

                CREATE TABLE IF NOT EXISTS ReviewAssignment (
                    review_assignment_id INTEGER PRIMARY KEY,
                    competition_id INTEGER NOT NULL,
                    reviewer_id INTEGER NOT NULL,
                    proposal_id INTEGER NOT NULL,
                    review_deadline DATE,
                    review_submitted BOOLEAN NOT NULL DEFAULT 0,
                    FOREIGN KEY (competition_id) REFERENCES Competition(competition_id)
                        ON DELETE CASCADE,
                    FOREIGN KEY (reviewer_id) REFERENCES Reviewer(reviewer_id),
                    FOREIGN KEY (proposal_id) REFERENCES Proposal(proposal_id)
                        ON DELETE CASCADE
                );

                CREATE TABLE IF NOT EXISTS ConflictOfInterest (
                    conflict_id INTEGER PRIMARY KEY,
                    reviewer_id INTEGER NOT NULL,
                    conflicted_researcher_id INTEGER NOT NULL,
                    FOREIGN KEY (reviewer_id) REFERENCES Reviewer(reviewer_id),
                    FOREIGN KEY (conflicted_researcher_id) REFERENCES Researcher(researcher_id)
                );

                CREATE TABLE IF NOT EXISTS Meeting (
                    meeting_id INTEGER PRIMARY KEY,
                    meeting_date DATE
                );

                CREATE TABLE IF NOT EXISTS MeetingParticipation (
                    meeting_id INTEGER NOT NULL,
                    competition_id INTEGER NOT NULL,
                    reviewer_id INTEGER NOT NULL,
                    PRIMARY KEY (meeting_id, competition_id, reviewer_id),
                    FOREIGN KEY (meeting_id) REFERENCES Meeting(meeting_id) ON DELETE CASCADE,
                    FOREIGN KEY (competition_id) REFERENCES Competition(competition_id)
                        ON DELETE CASCADE,
                    FOREIGN KEY (reviewer_id) REFERENCES Reviewer(reviewer_id)
                );

                CREATE TRIGGER IF NOT EXISTS trg_insert_award_check
                BEFORE INSERT ON Proposal
                WHEN NEW.proposal_status != 'Awarded'
                    AND (NEW.awarded_amount IS NOT NULL OR NEW.awarded_date IS NOT NULL)
                BEGIN
                    SELECT RAISE(FAIL, 'Only awarded proposals can have awarded_amount and awarded_date.');
                END;
                "#,
            )
            .map_err(|e| store_error("migration v1", e))?;
        }

        // Version 2: lookup indexes for the eligibility reads, and at most one
        // assignment per (proposal, reviewer) pair
        if from_version < 2 {
            conn.execute_batch(
                r#"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_assignment_pair
                    ON ReviewAssignment(proposal_id, reviewer_id);
                CREATE INDEX IF NOT EXISTS idx_assignment_reviewer
                    ON ReviewAssignment(reviewer_id);
                CREATE INDEX IF NOT EXISTS idx_conflict_reviewer
                    ON ConflictOfInterest(reviewer_id);
                CREATE INDEX IF NOT EXISTS idx_proposal_competition
                    ON Proposal(competition_id);
                "#,
            )
            .map_err(|e| store_error("migration v2", e))?;
        }

        conn.execute(
            "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
            [CURRENT_SCHEMA_VERSION],
        )
        .map_err(|e| store_error("update schema version", e))?;

        Ok(())
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| {
                StoreError::Unavailable(format!("{}: connection lock poisoned", operation))
            })?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::storage(operation, e.to_string()))?
    }
}

/// Classify a rusqlite error.
///
/// Constraint failures, trigger `RAISE`s included, are the caller's fault. A
/// database that cannot be opened or read at all is [`StoreError::Unavailable`].
pub(crate) fn store_error(operation: &'static str, error: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(err, message) = &error {
        let detail = message.clone().unwrap_or_else(|| error.to_string());
        match err.code {
            ErrorCode::ConstraintViolation => return StoreError::Constraint(detail),
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::SystemIoFailure
            | ErrorCode::DiskFull
            | ErrorCode::ReadOnly => {
                return StoreError::Unavailable(format!("{}: {}", operation, detail));
            }
            _ => {}
        }
    }
    StoreError::storage(operation, error.to_string())
}

#[async_trait]
impl CouncilStore for SqliteCouncilStore {
    async fn proposal_parties(
        &self,
        proposal: ProposalId,
    ) -> Result<Option<ProposalParties>, StoreError> {
        self.run("proposal parties", move |conn| {
            eligibility::proposal_parties(conn, proposal)
        })
        .await
    }

    async fn reviewer_loads(&self, proposal: ProposalId) -> Result<Vec<ReviewerLoad>, StoreError> {
        self.run("reviewer loads", move |conn| {
            eligibility::reviewer_loads(conn, proposal)
        })
        .await
    }

    async fn assignment_count(&self, proposal: ProposalId) -> Result<u32, StoreError> {
        self.run("assignment count", move |conn| {
            assignments::count_for_proposal(conn, proposal)
                .map_err(|e| store_error("assignment count", e))
        })
        .await
    }

    async fn insert_assignment(
        &self,
        assignment: NewAssignment,
        caps: AssignmentCaps,
    ) -> Result<AssignmentId, StoreError> {
        self.run("insert assignment", move |conn| {
            assignments::insert_checked(conn, &assignment, caps)
        })
        .await
    }

    async fn replace_assignments(
        &self,
        proposal: ProposalId,
        rows: Vec<NewAssignment>,
        caps: AssignmentCaps,
    ) -> Result<u32, StoreError> {
        self.run("replace assignments", move |conn| {
            assignments::replace(conn, proposal, &rows, caps)
        })
        .await
    }

    async fn open_competitions_with_large_proposals(
        &self,
        month: Month,
    ) -> Result<Vec<CompetitionSummary>, StoreError> {
        self.run("open competitions", move |conn| {
            reports::open_competitions(conn, month)
                .map_err(|e| store_error("open competitions", e))
        })
        .await
    }

    async fn largest_requested_in_area(
        &self,
        area: &str,
    ) -> Result<Vec<ProposalAmount>, StoreError> {
        let area = area.to_string();
        self.run("largest request", move |conn| {
            reports::largest_requested(conn, &area).map_err(|e| store_error("largest request", e))
        })
        .await
    }

    async fn largest_awarded_before(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ProposalAmount>, StoreError> {
        self.run("largest award", move |conn| {
            reports::largest_awarded(conn, date).map_err(|e| store_error("largest award", e))
        })
        .await
    }

    async fn discrepancy_in_area(&self, area: &str) -> Result<DiscrepancyReport, StoreError> {
        let area = area.to_string();
        self.run("discrepancy", move |conn| {
            reports::discrepancy(conn, &area).map_err(|e| store_error("discrepancy", e))
        })
        .await
    }

    async fn review_tasks(&self, reviewer_name: &str) -> Result<Vec<ReviewTask>, StoreError> {
        let name = reviewer_name.to_string();
        self.run("review tasks", move |conn| {
            reports::review_tasks(conn, &name).map_err(|e| store_error("review tasks", e))
        })
        .await
    }

    async fn dump_table(&self, table: Table) -> Result<TableDump, StoreError> {
        self.run("dump table", move |conn| {
            reports::dump_table(conn, table).map_err(|e| store_error("dump table", e))
        })
        .await
    }

    async fn insert_organization(
        &self,
        organization: NewOrganization,
    ) -> Result<OrganizationId, StoreError> {
        self.run("insert organization", move |conn| {
            records::insert_organization(conn, &organization)
        })
        .await
    }

    async fn insert_researcher(
        &self,
        researcher: NewResearcher,
    ) -> Result<ResearcherId, StoreError> {
        self.run("insert researcher", move |conn| {
            records::insert_researcher(conn, &researcher)
        })
        .await
    }

    async fn insert_competition(
        &self,
        competition: NewCompetition,
    ) -> Result<CompetitionId, StoreError> {
        self.run("insert competition", move |conn| {
            records::insert_competition(conn, &competition)
        })
        .await
    }

    async fn insert_proposal(&self, proposal: NewProposal) -> Result<ProposalId, StoreError> {
        self.run("insert proposal", move |conn| {
            records::insert_proposal(conn, &proposal)
        })
        .await
    }

    async fn add_collaborator(
        &self,
        proposal: ProposalId,
        researcher: ResearcherId,
    ) -> Result<bool, StoreError> {
        self.run("add collaborator", move |conn| {
            records::add_collaborator(conn, proposal, researcher)
        })
        .await
    }

    async fn insert_reviewer(&self, researcher: ResearcherId) -> Result<ReviewerId, StoreError> {
        self.run("insert reviewer", move |conn| {
            records::insert_reviewer(conn, researcher)
        })
        .await
    }

    async fn insert_conflict(&self, conflict: NewConflict) -> Result<ConflictId, StoreError> {
        self.run("insert conflict", move |conn| {
            records::insert_conflict(conn, &conflict)
        })
        .await
    }

    async fn insert_meeting(&self, meeting: NewMeeting) -> Result<MeetingId, StoreError> {
        self.run("insert meeting", move |conn| {
            records::insert_meeting(conn, &meeting)
        })
        .await
    }

    async fn add_meeting_participant(
        &self,
        participation: MeetingParticipation,
    ) -> Result<(), StoreError> {
        self.run("add meeting participant", move |conn| {
            records::add_meeting_participant(conn, &participation)
        })
        .await
    }
}
