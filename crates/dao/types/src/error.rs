//! Governance error types.

use thiserror::Error;

use crate::amount::Amount;
use crate::ids::{ActorId, ProposalId};

/// Infrastructure faults reported by an external asset ledger.
///
/// These never mean "zero balance"; a host must not treat an unreachable
/// ledger as an ineligible actor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("asset ledger unavailable: {0}")]
    Unavailable(String),

    #[error("malformed ledger response: {0}")]
    Malformed(String),

    #[error("no historical balance at checkpoint {checkpoint}")]
    CheckpointUnavailable { checkpoint: u64 },
}

/// Reasons a governance operation was rejected.
///
/// Every variant except [`GovernanceError::Ledger`] is a domain rejection.
/// All of them leave engine state exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernanceError {
    #[error("actor {actor} holds no governance weight")]
    Unauthorized { actor: ActorId },

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    /// Voting attempted on a closed proposal.
    #[error("proposal {0} is finalized and closed to voting")]
    ProposalFinalized(ProposalId),

    /// Finalization attempted twice.
    #[error("proposal {0} is already finalized")]
    AlreadyFinalized(ProposalId),

    #[error("actor {actor} already voted on proposal {id}")]
    AlreadyVoted { id: ProposalId, actor: ActorId },

    #[error("requested amount {requested} exceeds treasury balance {available}")]
    InsufficientTreasury { requested: Amount, available: Amount },

    #[error("proposal {id} has not reached quorum: tally {tally} does not exceed {quorum}")]
    QuorumNotMet {
        id: ProposalId,
        tally: Amount,
        quorum: Amount,
    },

    #[error("treasury transfer for proposal {id} failed: {reason}")]
    TransferFailed { id: ProposalId, reason: String },

    #[error("vote tally overflow on proposal {0}")]
    TallyOverflow(ProposalId),

    #[error("asset ledger fault: {0}")]
    Ledger(#[from] LedgerError),
}

impl GovernanceError {
    /// `false` for ledger faults, `true` for every rule-based rejection.
    pub fn is_domain_rejection(&self) -> bool {
        !matches!(self, GovernanceError::Ledger(_))
    }

    /// Stable snake_case label, e.g. `"quorum_not_met"`.
    pub fn kind(&self) -> &'static str {
        match self {
            GovernanceError::Unauthorized { .. } => "unauthorized",
            GovernanceError::ProposalNotFound(_) => "proposal_not_found",
            GovernanceError::ProposalFinalized(_) => "proposal_finalized",
            GovernanceError::AlreadyFinalized(_) => "already_finalized",
            GovernanceError::AlreadyVoted { .. } => "already_voted",
            GovernanceError::InsufficientTreasury { .. } => "insufficient_treasury",
            GovernanceError::QuorumNotMet { .. } => "quorum_not_met",
            GovernanceError::TransferFailed { .. } => "transfer_failed",
            GovernanceError::TallyOverflow(_) => "tally_overflow",
            GovernanceError::Ledger(_) => "ledger",
        }
    }
}
