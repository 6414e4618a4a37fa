//! Proposal and vote records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::ids::{ActorId, ProposalId};

/// Direction of a cast vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

impl std::fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteDirection::Up => write!(f, "up"),
            VoteDirection::Down => write!(f, "down"),
        }
    }
}

/// A spending proposal against the treasury.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub name: String,
    pub description: String,
    /// Requested disbursement, in treasury-asset base units.
    pub amount: Amount,
    pub recipient: ActorId,
    pub proposer: ActorId,
    /// Total weight cast, always `up_votes + down_votes`.
    pub votes: Amount,
    pub up_votes: Amount,
    pub down_votes: Amount,
    pub finalized: bool,
    pub created_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
    /// Governance-ledger checkpoint votes are weighed at, when weight is snapshotted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_checkpoint: Option<u64>,
}

impl Proposal {
    /// Returns `true` if `votes == up_votes + down_votes`.
    pub fn tallies_consistent(&self) -> bool {
        self.up_votes.checked_add(self.down_votes) == Some(self.votes)
    }

    pub fn status(&self) -> ProposalStatus {
        if self.finalized {
            ProposalStatus::Approved
        } else {
            ProposalStatus::InProgress
        }
    }
}

/// Lifecycle label shown to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    InProgress,
    /// Quorum was met and the requested amount was disbursed.
    Approved,
}

/// Participation facts for one (proposal, actor) pair.
///
/// Created on the actor's first vote and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voted: bool,
    pub up_voted: bool,
    pub down_voted: bool,
    /// Weight that was added to the proposal's tallies.
    pub weight: Amount,
    pub cast_at: DateTime<Utc>,
}

impl VoteRecord {
    pub fn cast(direction: VoteDirection, weight: Amount, cast_at: DateTime<Utc>) -> Self {
        Self {
            voted: true,
            up_voted: direction == VoteDirection::Up,
            down_voted: direction == VoteDirection::Down,
            weight,
            cast_at,
        }
    }

    pub fn direction(&self) -> Option<VoteDirection> {
        match (self.up_voted, self.down_voted) {
            (true, false) => Some(VoteDirection::Up),
            (false, true) => Some(VoteDirection::Down),
            _ => None,
        }
    }

    /// `voted == (up_voted || down_voted)` and never both directions.
    pub fn is_consistent(&self) -> bool {
        self.voted == (self.up_voted || self.down_voted) && !(self.up_voted && self.down_voted)
    }
}

/// Read view of a proposal returned to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSnapshot {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub status: ProposalStatus,
    /// Whether the configured quorum policy is currently satisfied.
    pub quorum_reached: bool,
}
