//! The governance engine: authorization, state mutation and the atomic
//! quorum-gated disbursement.
//!
//! Every mutating operation takes `&mut self`, so operations are totally
//! ordered by construction; a host that shares the engine wraps it in its own
//! lock. Each operation performs all fallible work (ledger reads, duplicate
//! and overflow checks, the treasury transfer) before committing in-memory
//! state, so a failed call leaves no partial change behind.

use std::sync::Arc;

use chrono::Utc;
use dao_types::{
    ActorId, Amount, AssetRef, GovernanceError, GovernanceEvent, GovernanceParams, LedgerError,
    Proposal, ProposalId, ProposalSnapshot, VoteDirection, VoteRecord, WeightPolicy,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, GovernanceConfig};
use crate::events::{EventBus, DEFAULT_EVENT_CAPACITY};
use crate::ledger::{AssetLedger, HistoricalLedger, TransferOutcome};
use crate::oracle::EligibilityOracle;
use crate::quorum::QuorumEvaluator;
use crate::registry::{ProposalDraft, ProposalRegistry};
use crate::state::{GovernanceState, StateError};
use crate::treasury::Treasury;
use crate::voting::VotingLedger;

/// The external ledgers an engine is wired to.
#[derive(Clone)]
pub struct GovernanceLedgers {
    pub governance_token: Arc<dyn AssetLedger>,
    pub treasury_asset: Arc<dyn AssetLedger>,
    /// Needed only for [`WeightPolicy::SnapshotAtCreation`].
    pub token_history: Option<Arc<dyn HistoricalLedger>>,
}

impl GovernanceLedgers {
    pub fn new(governance_token: Arc<dyn AssetLedger>, treasury_asset: Arc<dyn AssetLedger>) -> Self {
        Self {
            governance_token,
            treasury_asset,
            token_history: None,
        }
    }

    pub fn with_history(mut self, history: Arc<dyn HistoricalLedger>) -> Self {
        self.token_history = Some(history);
        self
    }
}

pub struct GovernanceEngine {
    params: GovernanceParams,
    oracle: EligibilityOracle,
    treasury: Treasury,
    quorum: QuorumEvaluator,
    registry: ProposalRegistry,
    votes: VotingLedger,
    events: EventBus,
}

impl GovernanceEngine {
    /// Build an engine with an empty registry and no vote records.
    pub fn new(params: GovernanceParams, ledgers: GovernanceLedgers) -> Result<Self, ConfigError> {
        Self::with_event_capacity(params, ledgers, DEFAULT_EVENT_CAPACITY)
    }

    /// Build an engine from loaded configuration.
    pub fn from_config(
        config: &GovernanceConfig,
        ledgers: GovernanceLedgers,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::with_event_capacity(config.governance.clone(), ledgers, config.events.capacity)
    }

    fn with_event_capacity(
        params: GovernanceParams,
        ledgers: GovernanceLedgers,
        event_capacity: usize,
    ) -> Result<Self, ConfigError> {
        let oracle = match (params.weight_policy, ledgers.token_history) {
            (WeightPolicy::Live, _) => EligibilityOracle::live(ledgers.governance_token),
            (WeightPolicy::SnapshotAtCreation, Some(history)) => {
                EligibilityOracle::snapshot(ledgers.governance_token, history)
            }
            (policy @ WeightPolicy::SnapshotAtCreation, None) => {
                return Err(ConfigError::MissingHistory(policy));
            }
        };

        let treasury = Treasury::new(
            ledgers.treasury_asset,
            params.treasury_account.clone(),
            params.treasury_asset.clone(),
        );
        let quorum = QuorumEvaluator::new(params.quorum, params.quorum_policy);

        info!(
            governance_token = %params.governance_token,
            treasury_asset = %params.treasury_asset,
            treasury_account = %params.treasury_account,
            quorum = %params.quorum,
            quorum_policy = ?params.quorum_policy,
            weight_policy = ?params.weight_policy,
            "Governance engine initialised"
        );

        Ok(Self {
            params,
            oracle,
            treasury,
            quorum,
            registry: ProposalRegistry::new(),
            votes: VotingLedger::new(),
            events: EventBus::new(event_capacity),
        })
    }

    /// Load a previously exported state into a freshly built engine.
    ///
    /// Fails with [`StateError::EngineNotEmpty`] once any proposal or vote
    /// exists, so restoring can never rewind the proposal counter.
    pub fn restore(mut self, state: GovernanceState) -> Result<Self, StateError> {
        if self.registry.count() > 0 || !self.votes.is_empty() {
            return Err(StateError::EngineNotEmpty {
                proposals: self.registry.count(),
            });
        }
        let registry = ProposalRegistry::from_proposals(state.proposals)?;
        let votes = VotingLedger::from_entries(state.votes, registry.proposals())?;
        info!(
            proposals = registry.count(),
            vote_records = votes.len(),
            "Governance state restored"
        );
        self.registry = registry;
        self.votes = votes;
        Ok(self)
    }

    /// Export the proposal table and vote-record set.
    pub fn export_state(&self) -> GovernanceState {
        GovernanceState {
            proposals: self.registry.proposals().to_vec(),
            votes: self.votes.entries(),
        }
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Register a spending proposal. Returns its id.
    pub async fn create_proposal(
        &mut self,
        actor: &ActorId,
        draft: ProposalDraft,
    ) -> Result<ProposalId, GovernanceError> {
        self.require_eligible(actor).await?;

        let available = self.treasury.balance().await?;
        if draft.amount > available {
            warn!(
                actor = %actor,
                requested = %draft.amount,
                available = %available,
                "Proposal rejected: amount exceeds treasury"
            );
            return Err(GovernanceError::InsufficientTreasury {
                requested: draft.amount,
                available,
            });
        }

        let checkpoint = self.oracle.checkpoint().await?;

        let amount = draft.amount;
        let recipient = draft.recipient.clone();
        let id = self
            .registry
            .insert(draft, actor.clone(), Utc::now(), checkpoint);

        info!(
            id = %id,
            proposer = %actor,
            recipient = %recipient,
            amount = %self.params.treasury_asset.format(amount),
            "Proposal created"
        );
        self.events.publish(GovernanceEvent::ProposalCreated {
            id,
            amount,
            recipient,
            proposer: actor.clone(),
        });
        Ok(id)
    }

    pub async fn vote_up(&mut self, actor: &ActorId, id: ProposalId) -> Result<(), GovernanceError> {
        self.vote(actor, id, VoteDirection::Up).await
    }

    pub async fn vote_down(
        &mut self,
        actor: &ActorId,
        id: ProposalId,
    ) -> Result<(), GovernanceError> {
        self.vote(actor, id, VoteDirection::Down).await
    }

    async fn vote(
        &mut self,
        actor: &ActorId,
        id: ProposalId,
        direction: VoteDirection,
    ) -> Result<(), GovernanceError> {
        let proposal = self
            .registry
            .get(id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if proposal.finalized {
            debug!(id = %id, voter = %actor, "Vote rejected: proposal finalized");
            return Err(GovernanceError::ProposalFinalized(id));
        }

        let weight = self.oracle.voting_weight(actor, proposal).await?;
        if weight.is_zero() {
            warn!(id = %id, voter = %actor, "Vote rejected: no governance weight");
            return Err(GovernanceError::Unauthorized {
                actor: actor.clone(),
            });
        }

        let proposal = self
            .registry
            .get_mut(id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if let Err(err) = self
            .votes
            .cast(proposal, actor, direction, weight, Utc::now())
        {
            warn!(id = %id, voter = %actor, error = %err, "Vote rejected");
            return Err(err);
        }

        info!(
            id = %id,
            voter = %actor,
            %direction,
            weight = %weight,
            up_votes = %proposal.up_votes,
            down_votes = %proposal.down_votes,
            "Vote cast"
        );
        self.events.publish(GovernanceEvent::VoteCast {
            id,
            weight,
            voter: actor.clone(),
            direction,
        });
        Ok(())
    }

    /// Disburse a proposal's amount once its tally strictly exceeds quorum.
    ///
    /// `finalized` flips only after the treasury ledger confirms the transfer.
    /// A rejected transfer or a ledger fault leaves the proposal open, and any
    /// eligible actor may retry.
    pub async fn finalize(&mut self, actor: &ActorId, id: ProposalId) -> Result<(), GovernanceError> {
        let proposal = self
            .registry
            .get(id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if proposal.finalized {
            return Err(GovernanceError::AlreadyFinalized(id));
        }
        let quorum_met = self.quorum.meets_quorum(proposal);
        let tally = self.quorum.tally(proposal);
        let amount = proposal.amount;
        let recipient = proposal.recipient.clone();

        self.require_eligible(actor).await?;

        if !quorum_met {
            warn!(
                id = %id,
                tally = %tally,
                quorum = %self.quorum.threshold(),
                "Finalize rejected: quorum not met"
            );
            return Err(GovernanceError::QuorumNotMet {
                id,
                tally,
                quorum: self.quorum.threshold(),
            });
        }

        let reference = match self.treasury.disburse(&recipient, amount).await {
            Ok(TransferOutcome::Completed { reference }) => reference,
            Ok(TransferOutcome::Rejected { reason }) => {
                warn!(id = %id, %reason, "Finalize rolled back: transfer rejected");
                return Err(GovernanceError::TransferFailed { id, reason });
            }
            Err(err) => {
                warn!(id = %id, error = %err, "Finalize rolled back: treasury ledger fault");
                return Err(err.into());
            }
        };

        self.registry.mark_finalized(id, Utc::now())?;

        info!(
            id = %id,
            finalized_by = %actor,
            recipient = %recipient,
            amount = %self.params.treasury_asset.format(amount),
            %reference,
            "Proposal finalized"
        );
        self.events.publish(GovernanceEvent::ProposalFinalized {
            id,
            amount,
            recipient,
            reference,
        });
        Ok(())
    }

    async fn require_eligible(&self, actor: &ActorId) -> Result<Amount, GovernanceError> {
        let weight = self.oracle.weight_of(actor).await?;
        if weight.is_zero() {
            warn!(actor = %actor, "Rejected: no governance weight");
            return Err(GovernanceError::Unauthorized {
                actor: actor.clone(),
            });
        }
        Ok(weight)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn proposal(&self, id: ProposalId) -> Result<ProposalSnapshot, GovernanceError> {
        self.registry
            .get(id)
            .map(|p| self.snapshot(p))
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    /// Every proposal, in id order.
    pub fn proposals(&self) -> Vec<ProposalSnapshot> {
        self.registry.iter().map(|p| self.snapshot(p)).collect()
    }

    pub fn proposal_count(&self) -> u64 {
        self.registry.count()
    }

    pub fn has_voted(&self, actor: &ActorId, id: ProposalId) -> bool {
        self.votes.has_voted(id, actor)
    }

    pub fn has_up_voted(&self, actor: &ActorId, id: ProposalId) -> bool {
        self.votes.has_up_voted(id, actor)
    }

    pub fn has_down_voted(&self, actor: &ActorId, id: ProposalId) -> bool {
        self.votes.has_down_voted(id, actor)
    }

    pub fn vote_record(&self, actor: &ActorId, id: ProposalId) -> Option<&VoteRecord> {
        self.votes.record(id, actor)
    }

    pub fn quorum(&self) -> Amount {
        self.quorum.threshold()
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn governance_token(&self) -> &AssetRef {
        &self.params.governance_token
    }

    pub fn treasury_asset(&self) -> &AssetRef {
        &self.params.treasury_asset
    }

    pub async fn treasury_balance(&self) -> Result<Amount, LedgerError> {
        self.treasury.balance().await
    }

    /// Live governance weight of `actor`.
    pub async fn weight_of(&self, actor: &ActorId) -> Result<Amount, LedgerError> {
        self.oracle.weight_of(actor).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GovernanceEvent> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn snapshot(&self, proposal: &Proposal) -> ProposalSnapshot {
        ProposalSnapshot {
            proposal: proposal.clone(),
            status: proposal.status(),
            quorum_reached: self.quorum.meets_quorum(proposal),
        }
    }
}
