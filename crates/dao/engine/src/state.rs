//! Exportable engine state.
//!
//! Persistence belongs to the host. This is the shape a host stores: the
//! proposal table keyed by id and the vote-record set keyed by (id, voter).

use dao_types::{ActorId, Proposal, ProposalId, VoteRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceState {
    /// Proposals in id order, starting at 1.
    pub proposals: Vec<Proposal>,
    pub votes: Vec<VoteEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEntry {
    pub proposal_id: ProposalId,
    pub voter: ActorId,
    #[serde(flatten)]
    pub record: VoteRecord,
}

/// Reasons an exported state cannot be loaded.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("proposal ids must be sequential: expected {expected}, found {found}")]
    NonSequentialId {
        expected: ProposalId,
        found: ProposalId,
    },

    #[error("tallies of proposal {0} do not match its vote records")]
    InconsistentTally(ProposalId),

    #[error("vote record of {voter} on proposal {id} is inconsistent")]
    InconsistentRecord { id: ProposalId, voter: ActorId },

    #[error("vote record references unknown proposal {0}")]
    UnknownProposal(ProposalId),

    #[error("duplicate vote record for {voter} on proposal {id}")]
    DuplicateVote { id: ProposalId, voter: ActorId },

    #[error("engine already holds {proposals} proposals; restore into a fresh engine")]
    EngineNotEmpty { proposals: u64 },

    #[error("state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GovernanceState {
    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(json)?)
    }
}
