//! In-memory [`CouncilStore`] used by the use case tests.

use crate::ports::council_store::{CouncilStore, StoreError};
use async_trait::async_trait;
use chrono::NaiveDate;
use council_domain::{
    AssignmentCaps, AssignmentId, CompetitionId, CompetitionSummary, ConflictId,
    DiscrepancyReport, MeetingId, MeetingParticipation, Month, NewAssignment, NewCompetition,
    NewConflict, NewMeeting, NewOrganization, NewProposal, NewResearcher, OrganizationId,
    ProposalAmount, ProposalId, ProposalParties, ResearcherId, ReviewTask, ReviewerId,
    ReviewerLoad, Table, TableDump,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    names: BTreeMap<ResearcherId, String>,
    reviewers: BTreeSet<ReviewerId>,
    proposals: BTreeMap<ProposalId, ProposalParties>,
    conflicts: Vec<(ReviewerId, ResearcherId)>,
    assignments: Vec<NewAssignment>,
    next_id: i64,
    failures: VecDeque<StoreError>,
    /// Assignments another writer adds while a session runs.
    concurrent: Vec<NewAssignment>,
    /// Count reads to let through before `concurrent` lands.
    concurrent_delay: u32,
    writes: usize,
}

pub(crate) struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn empty() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                ..State::default()
            }),
        }
    }

    /// Small fixture:
    ///
    /// - researchers 1..=20, reviewers 1..=10
    /// - proposal 1: competition 4, PI 15, collaborators {8,17,7,16,2,10,12,1}
    /// - proposal 2: competition 1, PI 3, collaborators {5,9}
    /// - proposal 3: competition 2, PI 11, fully assigned to reviewers 5, 6, 7
    /// - proposals 4..=6: competition 3, PI 20, each assigned to reviewer 8
    /// - conflicts: reviewer 1 with 16, reviewer 2 with 15, reviewer 3 with 19
    pub fn reference() -> Self {
        let store = Self::empty();
        {
            let mut state = store.state.lock().unwrap();
            for id in 1..=20 {
                state
                    .names
                    .insert(ResearcherId(id), format!("Researcher {}", id));
            }
            for id in 1..=10 {
                state.reviewers.insert(ReviewerId(id));
            }

            let proposals = [
                (1, 4, 15, vec![8, 17, 7, 16, 2, 10, 12, 1]),
                (2, 1, 3, vec![5, 9]),
                (3, 2, 11, vec![]),
                (4, 3, 20, vec![]),
                (5, 3, 20, vec![]),
                (6, 3, 20, vec![]),
            ];
            for (id, competition, pi, collaborators) in proposals {
                state.proposals.insert(
                    ProposalId(id),
                    ProposalParties::new(ProposalId(id), CompetitionId(competition), ResearcherId(pi))
                        .with_collaborators(collaborators.into_iter().map(ResearcherId)),
                );
            }

            state.conflicts = vec![
                (ReviewerId(1), ResearcherId(16)),
                (ReviewerId(2), ResearcherId(15)),
                (ReviewerId(3), ResearcherId(19)),
            ];

            for reviewer in [5, 6, 7] {
                state
                    .assignments
                    .push(assignment(3, 2, reviewer));
            }
            for proposal in [4, 5, 6] {
                state.assignments.push(assignment(proposal, 3, 8));
            }
        }
        store
    }

    pub fn seed_assignment(&self, proposal: ProposalId, reviewer: ReviewerId) {
        let mut state = self.state.lock().unwrap();
        let competition = state.proposals[&proposal].competition;
        state.assignments.push(NewAssignment {
            competition,
            reviewer,
            proposal,
            deadline: None,
            submitted: false,
        });
    }

    /// The next write fails with `error`.
    pub fn fail_next_write(&self, error: StoreError) {
        self.state.lock().unwrap().failures.push_back(error);
    }

    /// Another writer adds these assignments once `after_reads` count reads
    /// have gone by.
    pub fn add_concurrently(&self, proposal: ProposalId, reviewers: &[i64], after_reads: u32) {
        let mut state = self.state.lock().unwrap();
        state.concurrent_delay = after_reads;
        let competition = state.proposals[&proposal].competition;
        for reviewer in reviewers {
            state.concurrent.push(NewAssignment {
                competition,
                reviewer: ReviewerId(*reviewer),
                proposal,
                deadline: None,
                submitted: false,
            });
        }
    }

    pub fn parties(&self, proposal: ProposalId) -> Option<ProposalParties> {
        self.state.lock().unwrap().proposals.get(&proposal).cloned()
    }

    pub fn assignments_for(&self, proposal: ProposalId) -> Vec<NewAssignment> {
        self.state
            .lock()
            .unwrap()
            .assignments
            .iter()
            .filter(|a| a.proposal == proposal)
            .cloned()
            .collect()
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    fn next_id(state: &mut State) -> i64 {
        state.next_id += 1;
        state.next_id
    }

    fn take_failure(state: &mut State) -> Result<(), StoreError> {
        match state.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn assignment(proposal: i64, competition: i64, reviewer: i64) -> NewAssignment {
    NewAssignment {
        competition: CompetitionId(competition),
        reviewer: ReviewerId(reviewer),
        proposal: ProposalId(proposal),
        deadline: None,
        submitted: false,
    }
}

fn count(assignments: &[NewAssignment], f: impl Fn(&NewAssignment) -> bool) -> u32 {
    assignments.iter().filter(|a| f(a)).count() as u32
}

#[async_trait]
impl CouncilStore for InMemoryStore {
    async fn proposal_parties(
        &self,
        proposal: ProposalId,
    ) -> Result<Option<ProposalParties>, StoreError> {
        Ok(self.parties(proposal))
    }

    async fn reviewer_loads(&self, proposal: ProposalId) -> Result<Vec<ReviewerLoad>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .reviewers
            .iter()
            .map(|reviewer| {
                let name = state
                    .names
                    .get(&reviewer.researcher())
                    .cloned()
                    .unwrap_or_default();
                ReviewerLoad::new(*reviewer, name)
                    .with_assignments(
                        count(&state.assignments, |a| a.reviewer == *reviewer),
                        count(&state.assignments, |a| {
                            a.reviewer == *reviewer && a.proposal == proposal
                        }),
                    )
                    .with_conflicts(
                        state
                            .conflicts
                            .iter()
                            .filter(|(r, _)| r == reviewer)
                            .map(|(_, researcher)| *researcher),
                    )
            })
            .collect())
    }

    async fn assignment_count(&self, proposal: ProposalId) -> Result<u32, StoreError> {
        let mut state = self.state.lock().unwrap();
        if !state.concurrent.is_empty() {
            if state.concurrent_delay == 0 {
                let concurrent = std::mem::take(&mut state.concurrent);
                state.assignments.extend(concurrent);
            } else {
                state.concurrent_delay -= 1;
            }
        }
        Ok(count(&state.assignments, |a| a.proposal == proposal))
    }

    async fn insert_assignment(
        &self,
        assignment: NewAssignment,
        caps: AssignmentCaps,
    ) -> Result<AssignmentId, StoreError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;

        if caps.proposal_is_full(count(&state.assignments, |a| {
            a.proposal == assignment.proposal
        })) {
            return Err(StoreError::CapExceeded(format!(
                "proposal {} is full",
                assignment.proposal
            )));
        }
        if !caps.reviewer_has_capacity(count(&state.assignments, |a| {
            a.reviewer == assignment.reviewer
        })) {
            return Err(StoreError::CapExceeded(format!(
                "reviewer {} is at capacity",
                assignment.reviewer
            )));
        }

        state.assignments.push(assignment);
        state.writes += 1;
        Ok(AssignmentId(Self::next_id(&mut state)))
    }

    async fn replace_assignments(
        &self,
        proposal: ProposalId,
        assignments: Vec<NewAssignment>,
        _caps: AssignmentCaps,
    ) -> Result<u32, StoreError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;

        let before = state.assignments.len();
        state.assignments.retain(|a| a.proposal != proposal);
        let removed = (before - state.assignments.len()) as u32;
        state.writes += assignments.len();
        state.assignments.extend(assignments);
        Ok(removed)
    }

    async fn open_competitions_with_large_proposals(
        &self,
        _month: Month,
    ) -> Result<Vec<CompetitionSummary>, StoreError> {
        Ok(Vec::new())
    }

    async fn largest_requested_in_area(
        &self,
        _area: &str,
    ) -> Result<Vec<ProposalAmount>, StoreError> {
        Ok(Vec::new())
    }

    async fn largest_awarded_before(
        &self,
        _date: NaiveDate,
    ) -> Result<Vec<ProposalAmount>, StoreError> {
        Ok(Vec::new())
    }

    async fn discrepancy_in_area(&self, area: &str) -> Result<DiscrepancyReport, StoreError> {
        Ok(DiscrepancyReport {
            area: area.to_string(),
            average: None,
            proposals: 0,
        })
    }

    async fn review_tasks(&self, reviewer_name: &str) -> Result<Vec<ReviewTask>, StoreError> {
        let state = self.state.lock().unwrap();
        let reviewer = state
            .names
            .iter()
            .find(|(_, name)| name.as_str() == reviewer_name)
            .map(|(id, _)| ReviewerId(id.get()));

        Ok(state
            .assignments
            .iter()
            .filter(|a| Some(a.reviewer) == reviewer)
            .map(|a| ReviewTask {
                proposal: a.proposal,
                competition_title: format!("Competition {}", a.competition),
                deadline: a.deadline,
                submitted: a.submitted,
            })
            .collect())
    }

    async fn dump_table(&self, table: Table) -> Result<TableDump, StoreError> {
        Ok(TableDump::new(table, Vec::new()))
    }

    async fn insert_organization(
        &self,
        _organization: NewOrganization,
    ) -> Result<OrganizationId, StoreError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        Ok(OrganizationId(Self::next_id(&mut state)))
    }

    async fn insert_researcher(
        &self,
        researcher: NewResearcher,
    ) -> Result<ResearcherId, StoreError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let id = match researcher.id {
            Some(id) => id,
            None => ResearcherId(Self::next_id(&mut state)),
        };
        if state.names.contains_key(&id) {
            return Err(StoreError::Constraint(format!(
                "UNIQUE constraint failed: Researcher.researcher_id ({})",
                id
            )));
        }
        state
            .names
            .insert(id, format!("{} {}", researcher.first_name, researcher.last_name));
        Ok(id)
    }

    async fn insert_competition(
        &self,
        competition: NewCompetition,
    ) -> Result<CompetitionId, StoreError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        Ok(match competition.id {
            Some(id) => id,
            None => CompetitionId(Self::next_id(&mut state)),
        })
    }

    async fn insert_proposal(&self, proposal: NewProposal) -> Result<ProposalId, StoreError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let id = match proposal.id {
            Some(id) => id,
            None => ProposalId(Self::next_id(&mut state)),
        };
        state.proposals.insert(
            id,
            ProposalParties::new(id, proposal.competition, proposal.principal_investigator),
        );
        state.writes += 1;
        Ok(id)
    }

    async fn add_collaborator(
        &self,
        proposal: ProposalId,
        researcher: ResearcherId,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        match state.proposals.get_mut(&proposal) {
            Some(parties) => Ok(parties.collaborators.insert(researcher)),
            None => Err(StoreError::Constraint(
                "FOREIGN KEY constraint failed".to_string(),
            )),
        }
    }

    async fn insert_reviewer(&self, researcher: ResearcherId) -> Result<ReviewerId, StoreError> {
        let mut state = self.state.lock().unwrap();
        let reviewer = ReviewerId(researcher.get());
        state.reviewers.insert(reviewer);
        Ok(reviewer)
    }

    async fn insert_conflict(&self, conflict: NewConflict) -> Result<ConflictId, StoreError> {
        let mut state = self.state.lock().unwrap();
        state
            .conflicts
            .push((conflict.reviewer, conflict.conflicted_researcher));
        Ok(ConflictId(Self::next_id(&mut state)))
    }

    async fn insert_meeting(&self, meeting: NewMeeting) -> Result<MeetingId, StoreError> {
        let mut state = self.state.lock().unwrap();
        Ok(match meeting.id {
            Some(id) => id,
            None => MeetingId(Self::next_id(&mut state)),
        })
    }

    async fn add_meeting_participant(
        &self,
        _participation: MeetingParticipation,
    ) -> Result<(), StoreError> {
        Ok(())
    }
}
