//! Notifications emitted after each successful operation.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::ids::{ActorId, ProposalId};
use crate::proposal::VoteDirection;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GovernanceEvent {
    ProposalCreated {
        id: ProposalId,
        amount: Amount,
        recipient: ActorId,
        proposer: ActorId,
    },
    VoteCast {
        id: ProposalId,
        weight: Amount,
        voter: ActorId,
        direction: VoteDirection,
    },
    ProposalFinalized {
        id: ProposalId,
        amount: Amount,
        recipient: ActorId,
        /// Reference returned by the treasury-asset ledger for the disbursement.
        reference: String,
    },
}

impl GovernanceEvent {
    pub fn proposal_id(&self) -> ProposalId {
        match self {
            GovernanceEvent::ProposalCreated { id, .. }
            | GovernanceEvent::VoteCast { id, .. }
            | GovernanceEvent::ProposalFinalized { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GovernanceEvent::ProposalCreated { .. } => "proposal_created",
            GovernanceEvent::VoteCast { .. } => "vote_cast",
            GovernanceEvent::ProposalFinalized { .. } => "proposal_finalized",
        }
    }
}
