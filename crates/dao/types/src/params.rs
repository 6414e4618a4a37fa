//! Immutable governance parameters.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::ids::{ActorId, AssetRef};

/// Which accumulated weight must exceed the quorum threshold at finalize time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumPolicy {
    /// Favourable weight (`up_votes`) must strictly exceed the threshold.
    #[default]
    Approval,
    /// Total participating weight (`votes`) must strictly exceed the threshold.
    Participation,
}

/// How an actor's voting weight is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Governance-token balance read live at each call.
    #[default]
    Live,
    /// Governance-token balance as of the ledger checkpoint recorded when the
    /// proposal was created. Tokens acquired afterwards carry no weight on it.
    ///
    /// Vote eligibility is judged on that snapshot alone: a holder who sold
    /// every token after creation may still vote with their snapshot weight,
    /// and a buyer who acquired tokens afterwards may not. Creating and
    /// finalizing always require a positive live balance.
    SnapshotAtCreation,
}

/// Process-wide parameters fixed when the engine is constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Asset whose balance is voting weight.
    pub governance_token: AssetRef,
    /// Asset held by the treasury and paid out to recipients.
    pub treasury_asset: AssetRef,
    /// Account on the treasury-asset ledger that holds pooled funds.
    pub treasury_account: ActorId,
    /// Weight a proposal must strictly exceed to be finalized.
    pub quorum: Amount,
    #[serde(default)]
    pub quorum_policy: QuorumPolicy,
    #[serde(default)]
    pub weight_policy: WeightPolicy,
}
