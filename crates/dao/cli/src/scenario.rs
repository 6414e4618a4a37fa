//! Scenario replay against in-memory ledgers.
//!
//! A scenario seeds governance-token holders and the treasury, then runs a
//! list of governance operations. Each step may state the outcome it expects
//! (`"ok"` by default, otherwise an error kind such as `"quorum_not_met"`).

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use dao_engine::{
    ActorId, Amount, AssetRef, GovernanceConfig, GovernanceEngine, GovernanceError,
    GovernanceLedgers, GovernanceState, InMemoryAssetLedger, ProposalDraft, ProposalId,
    ProposalSnapshot, WeightPolicy,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,

    /// Governance-token balances, in whole tokens
    #[serde(default)]
    pub holders: Vec<Holding>,

    /// Treasury funding, in whole units of the treasury asset
    #[serde(default)]
    pub treasury_funding: u64,

    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Holding {
    pub actor: ActorId,
    pub tokens: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,

    #[serde(default = "expect_ok")]
    pub expect: String,
}

fn expect_ok() -> String {
    "ok".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    Propose {
        actor: ActorId,
        name: String,
        #[serde(default)]
        description: String,
        /// Whole units of the treasury asset
        amount: u64,
        recipient: ActorId,
    },
    VoteUp {
        actor: ActorId,
        proposal: ProposalId,
    },
    VoteDown {
        actor: ActorId,
        proposal: ProposalId,
    },
    Finalize {
        actor: ActorId,
        proposal: ProposalId,
    },
}

impl Action {
    pub fn op(&self) -> &'static str {
        match self {
            Action::Propose { .. } => "propose",
            Action::VoteUp { .. } => "vote_up",
            Action::VoteDown { .. } => "vote_down",
            Action::Finalize { .. } => "finalize",
        }
    }

    pub fn actor(&self) -> &ActorId {
        match self {
            Action::Propose { actor, .. }
            | Action::VoteUp { actor, .. }
            | Action::VoteDown { actor, .. }
            | Action::Finalize { actor, .. } => actor,
        }
    }
}

/// Outcome of one replayed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// 1-based position in the scenario
    pub step: usize,
    pub op: &'static str,
    pub actor: ActorId,
    pub proposal: Option<ProposalId>,
    pub expected: String,
    pub outcome: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    pub name: Option<String>,
    pub steps: Vec<StepReport>,
    pub proposals: Vec<ProposalSnapshot>,
    pub treasury_asset: AssetRef,
    pub treasury_balance: Amount,
    pub event_counts: BTreeMap<String, u64>,
    #[serde(skip)]
    pub state: GovernanceState,
}

impl Replay {
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.passed)
    }

    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.passed).count()
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> CliResult<Self> {
        let scenario: Scenario = serde_json::from_str(json)?;
        if scenario.steps.is_empty() {
            return Err(CliError::Scenario("scenario has no steps".into()));
        }
        Ok(scenario)
    }

    pub fn load(path: &Path) -> CliResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

fn whole_units(asset: &AssetRef, units: u64) -> CliResult<Amount> {
    asset.units(u128::from(units)).ok_or_else(|| {
        CliError::Scenario(format!(
            "{units} {} overflows 128-bit base units",
            asset.symbol
        ))
    })
}

/// Replay `scenario` on fresh in-memory ledgers. With `fail_fast`, replay
/// stops at the first step whose outcome differs from its expectation.
pub async fn run(
    config: &GovernanceConfig,
    scenario: &Scenario,
    fail_fast: bool,
) -> CliResult<Replay> {
    let params = &config.governance;
    let token = Arc::new(InMemoryAssetLedger::new(params.governance_token.id.clone()));
    let treasury = Arc::new(InMemoryAssetLedger::new(params.treasury_asset.id.clone()));

    for holding in &scenario.holders {
        let amount = whole_units(&params.governance_token, holding.tokens)?;
        token.mint(&holding.actor, amount)?;
    }
    let funding = whole_units(&params.treasury_asset, scenario.treasury_funding)?;
    treasury.mint(&params.treasury_account, funding)?;

    let mut ledgers = GovernanceLedgers::new(token.clone(), treasury.clone());
    if params.weight_policy == WeightPolicy::SnapshotAtCreation {
        ledgers = ledgers.with_history(token.clone());
    }
    let mut engine = GovernanceEngine::from_config(config, ledgers)?;

    info!(
        scenario = scenario.name.as_deref().unwrap_or("unnamed"),
        holders = scenario.holders.len(),
        steps = scenario.steps.len(),
        "Replaying scenario"
    );

    let mut reports = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let (proposal, result) = apply(&mut engine, &params.treasury_asset, &step.action).await?;

        let (outcome, detail) = match &result {
            Ok(()) => ("ok".to_string(), None),
            Err(err) => (err.kind().to_string(), Some(err.to_string())),
        };
        let passed = outcome == step.expect;
        let report = StepReport {
            step: index + 1,
            op: step.action.op(),
            actor: step.action.actor().clone(),
            proposal,
            expected: step.expect.clone(),
            outcome,
            passed,
            detail,
        };

        if passed {
            info!(step = report.step, op = report.op, outcome = %report.outcome, "Step replayed");
        } else {
            warn!(
                step = report.step,
                op = report.op,
                expected = %report.expected,
                outcome = %report.outcome,
                "Step outcome differs from expectation"
            );
        }
        reports.push(report);

        if fail_fast && !passed {
            break;
        }
    }

    let event_counts = engine
        .events()
        .counts()
        .iter()
        .map(|(kind, count)| (kind.to_string(), *count))
        .collect();

    Ok(Replay {
        name: scenario.name.clone(),
        steps: reports,
        proposals: engine.proposals(),
        treasury_asset: params.treasury_asset.clone(),
        treasury_balance: engine.treasury_balance().await?,
        event_counts,
        state: engine.export_state(),
    })
}

async fn apply(
    engine: &mut GovernanceEngine,
    treasury_asset: &AssetRef,
    action: &Action,
) -> CliResult<(Option<ProposalId>, Result<(), GovernanceError>)> {
    let applied = match action {
        Action::Propose {
            actor,
            name,
            description,
            amount,
            recipient,
        } => {
            let draft = ProposalDraft::new(
                name.clone(),
                description.clone(),
                whole_units(treasury_asset, *amount)?,
                recipient.clone(),
            );
            match engine.create_proposal(actor, draft).await {
                Ok(id) => (Some(id), Ok(())),
                Err(err) => (None, Err(err)),
            }
        }
        Action::VoteUp { actor, proposal } => {
            (Some(*proposal), engine.vote_up(actor, *proposal).await)
        }
        Action::VoteDown { actor, proposal } => {
            (Some(*proposal), engine.vote_down(actor, *proposal).await)
        }
        Action::Finalize { actor, proposal } => {
            (Some(*proposal), engine.finalize(actor, *proposal).await)
        }
    };
    Ok(applied)
}
