//! In-memory reference ledger.
//!
//! Balances are never stored: they are projected by replaying an append-only
//! journal of credits and transfers. A checkpoint is simply a journal length,
//! which makes historical balance queries a replay of a prefix.
//!
//! Deterministic and test-friendly; it also carries fault injection so hosts
//! can exercise the engine's ledger-outage and rejected-transfer paths.

use std::sync::RwLock;

use async_trait::async_trait;
use dao_types::{ActorId, Amount, LedgerError};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{AssetLedger, HistoricalLedger, TransferOutcome};

/// One journal line. `from == None` is a mint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalEntry {
    pub reference: String,
    pub from: Option<ActorId>,
    pub to: ActorId,
    pub amount: Amount,
}

#[derive(Debug, Default)]
struct FaultPlan {
    unavailable: Option<String>,
    reject_transfers: Option<String>,
}

pub struct InMemoryAssetLedger {
    asset: String,
    journal: RwLock<Vec<JournalEntry>>,
    faults: RwLock<FaultPlan>,
}

impl InMemoryAssetLedger {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            journal: RwLock::new(Vec::new()),
            faults: RwLock::new(FaultPlan::default()),
        }
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Credit `amount` to `to` out of thin air. Returns the journal reference.
    pub fn mint(&self, to: &ActorId, amount: Amount) -> Result<String, LedgerError> {
        let mut journal = self
            .journal
            .write()
            .map_err(|_| LedgerError::Unavailable("journal lock poisoned".to_string()))?;

        let reference = Uuid::new_v4().to_string();
        journal.push(JournalEntry {
            reference: reference.clone(),
            from: None,
            to: to.clone(),
            amount,
        });

        debug!(asset = %self.asset, to = %to, amount = %amount, "Minted");
        Ok(reference)
    }

    /// Make every call fail with [`LedgerError::Unavailable`] until cleared with `None`.
    pub fn set_unavailable(&self, reason: Option<&str>) -> Result<(), LedgerError> {
        let mut faults = self
            .faults
            .write()
            .map_err(|_| LedgerError::Unavailable("fault plan lock poisoned".to_string()))?;
        faults.unavailable = reason.map(str::to_string);
        Ok(())
    }

    /// Reject every transfer with `reason` until cleared with `None`.
    pub fn reject_transfers(&self, reason: Option<&str>) -> Result<(), LedgerError> {
        let mut faults = self
            .faults
            .write()
            .map_err(|_| LedgerError::Unavailable("fault plan lock poisoned".to_string()))?;
        faults.reject_transfers = reason.map(str::to_string);
        Ok(())
    }

    /// Snapshot of the journal, oldest first.
    pub fn journal(&self) -> Result<Vec<JournalEntry>, LedgerError> {
        let journal = self
            .journal
            .read()
            .map_err(|_| LedgerError::Unavailable("journal lock poisoned".to_string()))?;
        Ok(journal.clone())
    }

    fn check_available(&self) -> Result<Option<String>, LedgerError> {
        let faults = self
            .faults
            .read()
            .map_err(|_| LedgerError::Unavailable("fault plan lock poisoned".to_string()))?;
        if let Some(reason) = &faults.unavailable {
            return Err(LedgerError::Unavailable(reason.clone()));
        }
        Ok(faults.reject_transfers.clone())
    }
}

/// Replay `entries` and project the balance of `identity`.
fn project(entries: &[JournalEntry], identity: &ActorId) -> Result<Amount, LedgerError> {
    let mut credits = Amount::ZERO;
    let mut debits = Amount::ZERO;

    for entry in entries {
        if entry.to == *identity {
            credits = credits
                .checked_add(entry.amount)
                .ok_or_else(|| LedgerError::Malformed(format!("credit overflow for {identity}")))?;
        }
        if entry.from.as_ref() == Some(identity) {
            debits = debits
                .checked_add(entry.amount)
                .ok_or_else(|| LedgerError::Malformed(format!("debit overflow for {identity}")))?;
        }
    }

    credits
        .checked_sub(debits)
        .ok_or_else(|| LedgerError::Malformed(format!("negative balance for {identity}")))
}

#[async_trait]
impl AssetLedger for InMemoryAssetLedger {
    async fn balance_of(&self, identity: &ActorId) -> Result<Amount, LedgerError> {
        self.check_available()?;
        let journal = self
            .journal
            .read()
            .map_err(|_| LedgerError::Unavailable("journal lock poisoned".to_string()))?;
        project(&journal, identity)
    }

    async fn transfer(
        &self,
        from: &ActorId,
        to: &ActorId,
        amount: Amount,
    ) -> Result<TransferOutcome, LedgerError> {
        if let Some(reason) = self.check_available()? {
            warn!(asset = %self.asset, from = %from, to = %to, %reason, "Transfer rejected by fault plan");
            return Ok(TransferOutcome::Rejected { reason });
        }

        let mut journal = self
            .journal
            .write()
            .map_err(|_| LedgerError::Unavailable("journal lock poisoned".to_string()))?;

        let available = project(&journal, from)?;
        if available < amount {
            return Ok(TransferOutcome::Rejected {
                reason: format!("insufficient balance: {from} holds {available}, needs {amount}"),
            });
        }

        let reference = Uuid::new_v4().to_string();
        journal.push(JournalEntry {
            reference: reference.clone(),
            from: Some(from.clone()),
            to: to.clone(),
            amount,
        });

        debug!(asset = %self.asset, from = %from, to = %to, amount = %amount, %reference, "Transfer applied");
        Ok(TransferOutcome::Completed { reference })
    }
}

#[async_trait]
impl HistoricalLedger for InMemoryAssetLedger {
    async fn checkpoint(&self) -> Result<u64, LedgerError> {
        self.check_available()?;
        let journal = self
            .journal
            .read()
            .map_err(|_| LedgerError::Unavailable("journal lock poisoned".to_string()))?;
        Ok(journal.len() as u64)
    }

    async fn balance_of_at(
        &self,
        identity: &ActorId,
        checkpoint: u64,
    ) -> Result<Amount, LedgerError> {
        self.check_available()?;
        let journal = self
            .journal
            .read()
            .map_err(|_| LedgerError::Unavailable("journal lock poisoned".to_string()))?;

        let upto = usize::try_from(checkpoint)
            .ok()
            .filter(|upto| *upto <= journal.len())
            .ok_or(LedgerError::CheckpointUnavailable { checkpoint })?;
        project(&journal[..upto], identity)
    }
}
