//! Treasury accessor: a stateless seam over the treasury-asset ledger.

use std::sync::Arc;

use dao_types::{ActorId, Amount, AssetRef, LedgerError};
use tracing::info;

use crate::ledger::{AssetLedger, TransferOutcome};

pub struct Treasury {
    ledger: Arc<dyn AssetLedger>,
    account: ActorId,
    asset: AssetRef,
}

impl Treasury {
    pub fn new(ledger: Arc<dyn AssetLedger>, account: ActorId, asset: AssetRef) -> Self {
        Self {
            ledger,
            account,
            asset,
        }
    }

    pub fn account(&self) -> &ActorId {
        &self.account
    }

    pub fn asset(&self) -> &AssetRef {
        &self.asset
    }

    /// Treasury-asset balance held by the treasury account.
    pub async fn balance(&self) -> Result<Amount, LedgerError> {
        self.ledger.balance_of(&self.account).await
    }

    /// Pay `amount` out of the treasury to `recipient`.
    pub async fn disburse(
        &self,
        recipient: &ActorId,
        amount: Amount,
    ) -> Result<TransferOutcome, LedgerError> {
        info!(
            recipient = %recipient,
            amount = %self.asset.format(amount),
            "Requesting treasury disbursement"
        );
        self.ledger.transfer(&self.account, recipient, amount).await
    }
}
