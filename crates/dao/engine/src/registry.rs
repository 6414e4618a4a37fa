//! Proposal registry: the proposal table and id allocation.

use chrono::{DateTime, Utc};
use dao_types::{ActorId, Amount, GovernanceError, Proposal, ProposalId};

use crate::state::StateError;

/// Caller-supplied fields of a new proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalDraft {
    pub name: String,
    pub description: String,
    pub amount: Amount,
    pub recipient: ActorId,
}

impl ProposalDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        amount: Amount,
        recipient: ActorId,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            amount,
            recipient,
        }
    }
}

/// Arena of proposals; proposal `n` lives at index `n - 1`.
///
/// Proposals are never removed, so the table length doubles as the
/// monotonic proposal counter.
#[derive(Debug, Default)]
pub struct ProposalRegistry {
    proposals: Vec<Proposal>,
}

impl ProposalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from an exported table, checking ids run `1..=n` and tallies add up.
    pub fn from_proposals(proposals: Vec<Proposal>) -> Result<Self, StateError> {
        for (index, proposal) in proposals.iter().enumerate() {
            let expected = ProposalId::new(index as u64 + 1);
            if proposal.id != expected {
                return Err(StateError::NonSequentialId {
                    expected,
                    found: proposal.id,
                });
            }
            if !proposal.tallies_consistent() {
                return Err(StateError::InconsistentTally(proposal.id));
            }
        }
        Ok(Self { proposals })
    }

    /// Number of proposals ever created.
    pub fn count(&self) -> u64 {
        self.proposals.len() as u64
    }

    pub fn next_id(&self) -> ProposalId {
        ProposalId::new(self.count() + 1)
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        Self::index(id).and_then(|i| self.proposals.get(i))
    }

    pub(crate) fn get_mut(&mut self, id: ProposalId) -> Option<&mut Proposal> {
        Self::index(id).and_then(|i| self.proposals.get_mut(i))
    }

    /// Proposals in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    /// Allocate the next id and store a fresh, untallied proposal.
    pub(crate) fn insert(
        &mut self,
        draft: ProposalDraft,
        proposer: ActorId,
        created_at: DateTime<Utc>,
        weight_checkpoint: Option<u64>,
    ) -> ProposalId {
        let id = self.next_id();
        self.proposals.push(Proposal {
            id,
            name: draft.name,
            description: draft.description,
            amount: draft.amount,
            recipient: draft.recipient,
            proposer,
            votes: Amount::ZERO,
            up_votes: Amount::ZERO,
            down_votes: Amount::ZERO,
            finalized: false,
            created_at,
            finalized_at: None,
            weight_checkpoint,
        });
        id
    }

    pub(crate) fn mark_finalized(
        &mut self,
        id: ProposalId,
        at: DateTime<Utc>,
    ) -> Result<(), GovernanceError> {
        let proposal = self
            .get_mut(id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        proposal.finalized = true;
        proposal.finalized_at = Some(at);
        Ok(())
    }

    fn index(id: ProposalId) -> Option<usize> {
        id.get()
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
    }
}
