//! Eligibility oracle: voting weight from the governance-token ledger.

use std::sync::Arc;

use dao_types::{ActorId, Amount, LedgerError, Proposal, WeightPolicy};
use tracing::debug;

use crate::ledger::{AssetLedger, HistoricalLedger};

/// Answers "how much governance weight does this actor hold?".
///
/// Under [`WeightPolicy::Live`] every question goes to the ledger's current
/// balance. Under [`WeightPolicy::SnapshotAtCreation`] votes are weighed at
/// the checkpoint stored on the proposal; `create` and `finalize` still use
/// the live balance.
pub struct EligibilityOracle {
    ledger: Arc<dyn AssetLedger>,
    history: Option<Arc<dyn HistoricalLedger>>,
    policy: WeightPolicy,
}

impl EligibilityOracle {
    pub fn live(ledger: Arc<dyn AssetLedger>) -> Self {
        Self {
            ledger,
            history: None,
            policy: WeightPolicy::Live,
        }
    }

    pub fn snapshot(ledger: Arc<dyn AssetLedger>, history: Arc<dyn HistoricalLedger>) -> Self {
        Self {
            ledger,
            history: Some(history),
            policy: WeightPolicy::SnapshotAtCreation,
        }
    }

    pub fn policy(&self) -> WeightPolicy {
        self.policy
    }

    /// Live governance-token balance of `actor`.
    pub async fn weight_of(&self, actor: &ActorId) -> Result<Amount, LedgerError> {
        let weight = self.ledger.balance_of(actor).await?;
        debug!(actor = %actor, weight = %weight, "Weight looked up");
        Ok(weight)
    }

    pub async fn is_eligible(&self, actor: &ActorId) -> Result<bool, LedgerError> {
        Ok(!self.weight_of(actor).await?.is_zero())
    }

    /// Checkpoint to record on a new proposal, if weights are snapshotted.
    pub async fn checkpoint(&self) -> Result<Option<u64>, LedgerError> {
        match &self.history {
            Some(history) => history.checkpoint().await.map(Some),
            None => Ok(None),
        }
    }

    /// Weight `actor` may apply to `proposal` under the configured policy.
    ///
    /// With a recorded checkpoint this is the snapshot balance only; the live
    /// balance is not consulted, so a zero live balance does not bar the vote.
    pub async fn voting_weight(
        &self,
        actor: &ActorId,
        proposal: &Proposal,
    ) -> Result<Amount, LedgerError> {
        match (&self.history, proposal.weight_checkpoint) {
            (Some(history), Some(checkpoint)) => {
                let weight = history.balance_of_at(actor, checkpoint).await?;
                debug!(actor = %actor, weight = %weight, checkpoint, "Snapshot weight looked up");
                Ok(weight)
            }
            _ => self.weight_of(actor).await,
        }
    }
}
