//! Seam to the external asset ledgers.
//!
//! The engine talks to two ledgers through the same two-method trait: the
//! governance token (voting weight) and the treasury asset (disbursements).
//! Both are injected as `Arc<dyn AssetLedger>`.

pub mod memory;

use async_trait::async_trait;
use dao_types::{ActorId, Amount, LedgerError};
use serde::{Deserialize, Serialize};

pub use memory::InMemoryAssetLedger;

/// Result of a transfer request that the ledger processed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransferOutcome {
    /// Funds moved; `reference` identifies the transfer on the ledger.
    Completed { reference: String },
    /// The ledger refused the transfer; nothing moved.
    Rejected { reason: String },
}

impl TransferOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TransferOutcome::Completed { .. })
    }
}

/// Fungible asset ledger.
///
/// `Err` is reserved for infrastructure faults. A transfer the ledger
/// understood but declined is `Ok(TransferOutcome::Rejected { .. })`.
#[async_trait]
pub trait AssetLedger: Send + Sync {
    /// Current balance of `identity`.
    async fn balance_of(&self, identity: &ActorId) -> Result<Amount, LedgerError>;

    /// Move `amount` from `from` to `to`, reporting the outcome synchronously.
    async fn transfer(
        &self,
        from: &ActorId,
        to: &ActorId,
        amount: Amount,
    ) -> Result<TransferOutcome, LedgerError>;
}

/// Optional extension for ledgers that can answer balance queries in the past.
///
/// Only needed for [`dao_types::WeightPolicy::SnapshotAtCreation`].
#[async_trait]
pub trait HistoricalLedger: Send + Sync {
    /// Opaque, monotonically increasing position in the ledger's history.
    async fn checkpoint(&self) -> Result<u64, LedgerError>;

    /// Balance of `identity` as of `checkpoint`.
    async fn balance_of_at(
        &self,
        identity: &ActorId,
        checkpoint: u64,
    ) -> Result<Amount, LedgerError>;
}
