//! Voting ledger: one append-only participation record per (proposal, actor).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use dao_types::{ActorId, Amount, GovernanceError, Proposal, ProposalId, VoteDirection, VoteRecord};

use crate::state::{StateError, VoteEntry};

#[derive(Debug, Default)]
pub struct VotingLedger {
    records: HashMap<(ProposalId, ActorId), VoteRecord>,
}

impl VotingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from exported entries, checking every record against the
    /// proposal tallies it contributed to.
    pub fn from_entries(entries: Vec<VoteEntry>, proposals: &[Proposal]) -> Result<Self, StateError> {
        let mut records = HashMap::with_capacity(entries.len());
        let mut sums: HashMap<ProposalId, (Amount, Amount)> = HashMap::new();

        for entry in entries {
            if !entry.record.is_consistent() || !entry.record.voted {
                return Err(StateError::InconsistentRecord {
                    id: entry.proposal_id,
                    voter: entry.voter,
                });
            }
            let known = entry
                .proposal_id
                .get()
                .checked_sub(1)
                .and_then(|i| usize::try_from(i).ok())
                .is_some_and(|i| i < proposals.len());
            if !known {
                return Err(StateError::UnknownProposal(entry.proposal_id));
            }

            let (up, down) = sums.entry(entry.proposal_id).or_default();
            let slot = if entry.record.up_voted { up } else { down };
            *slot = slot
                .checked_add(entry.record.weight)
                .ok_or(StateError::InconsistentTally(entry.proposal_id))?;

            let key = (entry.proposal_id, entry.voter);
            if records.contains_key(&key) {
                let (id, voter) = key;
                return Err(StateError::DuplicateVote { id, voter });
            }
            records.insert(key, entry.record);
        }

        for proposal in proposals {
            let (up, down) = sums.get(&proposal.id).copied().unwrap_or_default();
            if up != proposal.up_votes || down != proposal.down_votes {
                return Err(StateError::InconsistentTally(proposal.id));
            }
        }

        Ok(Self { records })
    }

    pub fn record(&self, id: ProposalId, actor: &ActorId) -> Option<&VoteRecord> {
        self.records.get(&(id, actor.clone()))
    }

    pub fn has_voted(&self, id: ProposalId, actor: &ActorId) -> bool {
        self.record(id, actor).is_some_and(|r| r.voted)
    }

    pub fn has_up_voted(&self, id: ProposalId, actor: &ActorId) -> bool {
        self.record(id, actor).is_some_and(|r| r.up_voted)
    }

    pub fn has_down_voted(&self, id: ProposalId, actor: &ActorId) -> bool {
        self.record(id, actor).is_some_and(|r| r.down_voted)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by proposal id, then voter.
    pub fn entries(&self) -> Vec<VoteEntry> {
        let mut entries: Vec<VoteEntry> = self
            .records
            .iter()
            .map(|((id, voter), record)| VoteEntry {
                proposal_id: *id,
                voter: voter.clone(),
                record: record.clone(),
            })
            .collect();
        entries.sort_by(|a, b| (a.proposal_id, &a.voter).cmp(&(b.proposal_id, &b.voter)));
        entries
    }

    /// Record `voter`'s vote and apply `weight` to `proposal`.
    ///
    /// The record and both tallies change together or not at all: the
    /// duplicate check and overflow-checked sums run before anything is written.
    pub(crate) fn cast(
        &mut self,
        proposal: &mut Proposal,
        voter: &ActorId,
        direction: VoteDirection,
        weight: Amount,
        at: DateTime<Utc>,
    ) -> Result<(), GovernanceError> {
        let key = (proposal.id, voter.clone());
        if self.records.get(&key).is_some_and(|r| r.voted) {
            return Err(GovernanceError::AlreadyVoted {
                id: proposal.id,
                actor: voter.clone(),
            });
        }

        let votes = proposal
            .votes
            .checked_add(weight)
            .ok_or(GovernanceError::TallyOverflow(proposal.id))?;
        let directional = match direction {
            VoteDirection::Up => proposal.up_votes,
            VoteDirection::Down => proposal.down_votes,
        }
        .checked_add(weight)
        .ok_or(GovernanceError::TallyOverflow(proposal.id))?;

        self.records
            .insert(key, VoteRecord::cast(direction, weight, at));
        proposal.votes = votes;
        match direction {
            VoteDirection::Up => proposal.up_votes = directional,
            VoteDirection::Down => proposal.down_votes = directional,
        }
        Ok(())
    }
}
