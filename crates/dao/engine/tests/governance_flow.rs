//! End-to-end governance flows against in-memory ledgers.

use std::sync::Arc;

use dao_engine::{
    ActorId, Amount, AssetLedger, AssetRef, GovernanceEngine, GovernanceError, GovernanceEvent,
    GovernanceLedgers, GovernanceParams, GovernanceState, InMemoryAssetLedger, LedgerError,
    ProposalDraft, ProposalId, ProposalStatus, QuorumPolicy, StateError, VoteDirection,
    WeightPolicy,
};

const TOKEN: u128 = 1_000_000_000_000_000_000; // 10^18
const USDC: u128 = 1_000_000; // 10^6

struct Dao {
    engine: GovernanceEngine,
    token: Arc<InMemoryAssetLedger>,
    usdc: Arc<InMemoryAssetLedger>,
}

fn actor(name: &str) -> ActorId {
    ActorId::new(name)
}

fn params(quorum_policy: QuorumPolicy, weight_policy: WeightPolicy) -> GovernanceParams {
    GovernanceParams {
        governance_token: AssetRef::new("snarf", "SNARF", 18),
        treasury_asset: AssetRef::new("usdc", "USDC", 6),
        treasury_account: actor("dao-treasury"),
        quorum: Amount::new(500_000 * TOKEN),
        quorum_policy,
        weight_policy,
    }
}

/// Three investors with 200,000 tokens each and a 1,000 USDC treasury.
fn dao_with(quorum_policy: QuorumPolicy, weight_policy: WeightPolicy) -> Dao {
    let token = Arc::new(InMemoryAssetLedger::new("snarf"));
    let usdc = Arc::new(InMemoryAssetLedger::new("usdc"));

    for investor in ["investor1", "investor2", "investor3"] {
        token
            .mint(&actor(investor), Amount::new(200_000 * TOKEN))
            .unwrap();
    }
    usdc.mint(&actor("dao-treasury"), Amount::new(1_000 * USDC))
        .unwrap();

    let mut ledgers = GovernanceLedgers::new(token.clone(), usdc.clone());
    if weight_policy == WeightPolicy::SnapshotAtCreation {
        ledgers = ledgers.with_history(token.clone());
    }
    let engine = GovernanceEngine::new(params(quorum_policy, weight_policy), ledgers).unwrap();

    Dao {
        engine,
        token,
        usdc,
    }
}

fn dao() -> Dao {
    dao_with(QuorumPolicy::Approval, WeightPolicy::Live)
}

fn draft(n: u64, usdc: u128) -> ProposalDraft {
    ProposalDraft::new(
        format!("Proposal {n}"),
        "Description",
        Amount::new(usdc * USDC),
        actor("recipient"),
    )
}

async fn balance(ledger: &InMemoryAssetLedger, who: &str) -> Amount {
    ledger.balance_of(&actor(who)).await.unwrap()
}

#[tokio::test]
async fn three_up_votes_pass_quorum_and_disburse_once() {
    let mut dao = dao();
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    assert_eq!(id, ProposalId::new(1));

    for investor in ["investor1", "investor2", "investor3"] {
        dao.engine.vote_up(&actor(investor), id).await.unwrap();
    }
    let snapshot = dao.engine.proposal(id).unwrap();
    assert_eq!(snapshot.proposal.up_votes, Amount::new(600_000 * TOKEN));
    assert!(snapshot.quorum_reached);

    dao.engine.finalize(&actor("investor1"), id).await.unwrap();

    assert_eq!(balance(&dao.usdc, "recipient").await, Amount::new(100 * USDC));
    assert_eq!(balance(&dao.usdc, "dao-treasury").await, Amount::new(900 * USDC));
    assert_eq!(
        dao.engine.proposal(id).unwrap().status,
        ProposalStatus::Approved
    );

    assert_eq!(
        dao.engine.finalize(&actor("investor2"), id).await.unwrap_err(),
        GovernanceError::AlreadyFinalized(id)
    );
    assert_eq!(balance(&dao.usdc, "recipient").await, Amount::new(100 * USDC));
}

#[tokio::test]
async fn two_up_votes_do_not_meet_quorum() {
    let mut dao = dao();
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    dao.engine.vote_up(&actor("investor1"), id).await.unwrap();
    dao.engine.vote_up(&actor("investor2"), id).await.unwrap();

    let err = dao.engine.finalize(&actor("investor1"), id).await.unwrap_err();
    assert_eq!(
        err,
        GovernanceError::QuorumNotMet {
            id,
            tally: Amount::new(400_000 * TOKEN),
            quorum: Amount::new(500_000 * TOKEN),
        }
    );
    assert!(!dao.engine.proposal(id).unwrap().proposal.finalized);
    assert_eq!(balance(&dao.usdc, "dao-treasury").await, Amount::new(1_000 * USDC));
}

#[tokio::test]
async fn tally_equal_to_quorum_is_not_enough() {
    let mut dao = dao();
    dao.token
        .mint(&actor("investor4"), Amount::new(100_000 * TOKEN))
        .unwrap();
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    dao.engine.vote_up(&actor("investor1"), id).await.unwrap();
    dao.engine.vote_up(&actor("investor2"), id).await.unwrap();
    dao.engine.vote_up(&actor("investor4"), id).await.unwrap();

    assert!(!dao.engine.proposal(id).unwrap().quorum_reached);
    assert!(matches!(
        dao.engine.finalize(&actor("investor1"), id).await,
        Err(GovernanceError::QuorumNotMet { .. })
    ));
}

#[tokio::test]
async fn down_votes_do_not_count_under_approval_policy() {
    let mut dao = dao();
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    dao.engine.vote_up(&actor("investor1"), id).await.unwrap();
    dao.engine.vote_up(&actor("investor2"), id).await.unwrap();
    dao.engine.vote_down(&actor("investor3"), id).await.unwrap();

    let p = dao.engine.proposal(id).unwrap().proposal;
    assert_eq!(p.votes, Amount::new(600_000 * TOKEN));
    assert!(matches!(
        dao.engine.finalize(&actor("investor1"), id).await,
        Err(GovernanceError::QuorumNotMet { .. })
    ));
}

#[tokio::test]
async fn participation_policy_counts_every_vote() {
    let mut dao = dao_with(QuorumPolicy::Participation, WeightPolicy::Live);
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    dao.engine.vote_up(&actor("investor1"), id).await.unwrap();
    dao.engine.vote_up(&actor("investor2"), id).await.unwrap();
    dao.engine.vote_down(&actor("investor3"), id).await.unwrap();

    dao.engine.finalize(&actor("investor3"), id).await.unwrap();
    assert!(dao.engine.proposal(id).unwrap().proposal.finalized);
}

#[tokio::test]
async fn second_vote_is_rejected_and_tallies_unchanged() {
    let mut dao = dao();
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    dao.engine.vote_up(&actor("investor1"), id).await.unwrap();
    let before = dao.engine.proposal(id).unwrap().proposal;

    let err = dao.engine.vote_down(&actor("investor1"), id).await.unwrap_err();
    assert_eq!(
        err,
        GovernanceError::AlreadyVoted {
            id,
            actor: actor("investor1"),
        }
    );
    assert!(matches!(
        dao.engine.vote_up(&actor("investor1"), id).await,
        Err(GovernanceError::AlreadyVoted { .. })
    ));

    assert_eq!(dao.engine.proposal(id).unwrap().proposal, before);
    assert!(dao.engine.has_up_voted(&actor("investor1"), id));
    assert!(!dao.engine.has_down_voted(&actor("investor1"), id));
}

#[tokio::test]
async fn zero_balance_actor_is_rejected_everywhere() {
    let mut dao = dao();
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    for investor in ["investor1", "investor2", "investor3"] {
        dao.engine.vote_up(&actor(investor), id).await.unwrap();
    }
    let user = actor("user");

    assert!(matches!(
        dao.engine.create_proposal(&user, draft(2, 100)).await,
        Err(GovernanceError::Unauthorized { .. })
    ));
    assert!(matches!(
        dao.engine.vote_up(&user, id).await,
        Err(GovernanceError::Unauthorized { .. })
    ));
    assert!(matches!(
        dao.engine.vote_down(&user, id).await,
        Err(GovernanceError::Unauthorized { .. })
    ));
    assert!(matches!(
        dao.engine.finalize(&user, id).await,
        Err(GovernanceError::Unauthorized { .. })
    ));

    assert_eq!(dao.engine.proposal_count(), 1);
    assert!(!dao.engine.has_voted(&user, id));
    assert!(!dao.engine.proposal(id).unwrap().proposal.finalized);
}

#[tokio::test]
async fn finalize_checks_run_in_order() {
    let mut dao = dao();
    let user = actor("user");
    let passed = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    for investor in ["investor1", "investor2", "investor3"] {
        dao.engine.vote_up(&actor(investor), passed).await.unwrap();
    }
    dao.engine.finalize(&actor("investor1"), passed).await.unwrap();

    let below_quorum = dao
        .engine
        .create_proposal(&actor("investor1"), draft(2, 100))
        .await
        .unwrap();
    dao.engine.vote_up(&actor("investor1"), below_quorum).await.unwrap();

    // Unknown id before eligibility.
    assert_eq!(
        dao.engine.finalize(&user, ProposalId::new(9)).await,
        Err(GovernanceError::ProposalNotFound(ProposalId::new(9)))
    );
    // Already finalized before eligibility.
    assert_eq!(
        dao.engine.finalize(&user, passed).await,
        Err(GovernanceError::AlreadyFinalized(passed))
    );
    // Eligibility before quorum.
    assert_eq!(
        dao.engine.finalize(&user, below_quorum).await,
        Err(GovernanceError::Unauthorized { actor: user.clone() })
    );
    assert!(matches!(
        dao.engine.finalize(&actor("investor2"), below_quorum).await,
        Err(GovernanceError::QuorumNotMet { .. })
    ));
}

#[tokio::test]
async fn vote_checks_run_in_order() {
    let mut dao = dao();
    let user = actor("user");
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    for investor in ["investor1", "investor2", "investor3"] {
        dao.engine.vote_up(&actor(investor), id).await.unwrap();
    }

    // Eligibility before the duplicate check.
    assert_eq!(
        dao.engine.vote_down(&user, id).await,
        Err(GovernanceError::Unauthorized { actor: user.clone() })
    );

    dao.engine.finalize(&actor("investor1"), id).await.unwrap();

    // Unknown id and finalized proposal before eligibility.
    assert_eq!(
        dao.engine.vote_up(&user, ProposalId::new(9)).await,
        Err(GovernanceError::ProposalNotFound(ProposalId::new(9)))
    );
    assert_eq!(
        dao.engine.vote_up(&user, id).await,
        Err(GovernanceError::ProposalFinalized(id))
    );
    // Finalized before the duplicate check.
    assert_eq!(
        dao.engine.vote_down(&actor("investor1"), id).await,
        Err(GovernanceError::ProposalFinalized(id))
    );
}

#[tokio::test]
async fn holder_who_sells_out_loses_rights_under_live_policy() {
    let mut dao = dao();
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();

    let outcome = dao
        .token
        .transfer(&actor("investor1"), &actor("exchange"), Amount::new(200_000 * TOKEN))
        .await
        .unwrap();
    assert!(outcome.is_completed());

    assert!(matches!(
        dao.engine.vote_up(&actor("investor1"), id).await,
        Err(GovernanceError::Unauthorized { .. })
    ));
    dao.engine.vote_up(&actor("exchange"), id).await.unwrap();
}

#[tokio::test]
async fn proposal_above_treasury_is_rejected() {
    let mut dao = dao();
    let err = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 1_001))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GovernanceError::InsufficientTreasury {
            requested: Amount::new(1_001 * USDC),
            available: Amount::new(1_000 * USDC),
        }
    );
    assert_eq!(dao.engine.proposal_count(), 0);
    assert!(dao.engine.proposal(ProposalId::new(1)).is_err());
}

#[tokio::test]
async fn operations_on_unknown_proposals() {
    let mut dao = dao();
    let missing = ProposalId::new(7);
    assert_eq!(
        dao.engine.vote_up(&actor("investor1"), missing).await,
        Err(GovernanceError::ProposalNotFound(missing))
    );
    assert_eq!(
        dao.engine.finalize(&actor("investor1"), missing).await,
        Err(GovernanceError::ProposalNotFound(missing))
    );
    assert_eq!(
        dao.engine.proposal(ProposalId::new(0)).unwrap_err(),
        GovernanceError::ProposalNotFound(ProposalId::new(0))
    );
}

#[tokio::test]
async fn finalized_proposal_rejects_votes() {
    let mut dao = dao();
    dao.token
        .mint(&actor("latecomer"), Amount::new(TOKEN))
        .unwrap();
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    for investor in ["investor1", "investor2", "investor3"] {
        dao.engine.vote_up(&actor(investor), id).await.unwrap();
    }
    dao.engine.finalize(&actor("investor1"), id).await.unwrap();

    assert_eq!(
        dao.engine.vote_up(&actor("latecomer"), id).await,
        Err(GovernanceError::ProposalFinalized(id))
    );
}

#[tokio::test]
async fn treasury_drained_between_create_and_finalize_keeps_proposal_open() {
    let mut dao = dao();
    let first = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 700))
        .await
        .unwrap();
    let second = dao
        .engine
        .create_proposal(&actor("investor1"), draft(2, 700))
        .await
        .unwrap();
    for id in [first, second] {
        for investor in ["investor1", "investor2", "investor3"] {
            dao.engine.vote_up(&actor(investor), id).await.unwrap();
        }
    }

    dao.engine.finalize(&actor("investor1"), first).await.unwrap();
    let err = dao.engine.finalize(&actor("investor1"), second).await.unwrap_err();
    assert!(matches!(err, GovernanceError::TransferFailed { id, .. } if id == second));
    assert!(!dao.engine.proposal(second).unwrap().proposal.finalized);

    dao.usdc
        .mint(&actor("dao-treasury"), Amount::new(1_000 * USDC))
        .unwrap();
    dao.engine.finalize(&actor("investor2"), second).await.unwrap();
    assert_eq!(balance(&dao.usdc, "recipient").await, Amount::new(1_400 * USDC));
}

#[tokio::test]
async fn ledger_outage_is_distinct_from_ineligibility() {
    let mut dao = dao();
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();

    dao.token.set_unavailable(Some("node syncing")).unwrap();
    let err = dao.engine.vote_up(&actor("investor1"), id).await.unwrap_err();
    assert_eq!(
        err,
        GovernanceError::Ledger(LedgerError::Unavailable("node syncing".into()))
    );
    assert!(!dao.engine.has_voted(&actor("investor1"), id));

    dao.token.set_unavailable(None).unwrap();
    dao.engine.vote_up(&actor("investor1"), id).await.unwrap();
}

#[tokio::test]
async fn treasury_ledger_outage_during_finalize_keeps_proposal_open() {
    let mut dao = dao();
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    for investor in ["investor1", "investor2", "investor3"] {
        dao.engine.vote_up(&actor(investor), id).await.unwrap();
    }

    dao.usdc.set_unavailable(Some("maintenance")).unwrap();
    assert!(matches!(
        dao.engine.finalize(&actor("investor1"), id).await,
        Err(GovernanceError::Ledger(LedgerError::Unavailable(_)))
    ));
    assert!(!dao.engine.proposal(id).unwrap().proposal.finalized);

    dao.usdc.set_unavailable(None).unwrap();
    dao.engine.finalize(&actor("investor1"), id).await.unwrap();
}

#[tokio::test]
async fn snapshot_policy_uses_balances_at_creation() {
    let mut dao = dao_with(QuorumPolicy::Approval, WeightPolicy::SnapshotAtCreation);
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    assert!(dao.engine.proposal(id).unwrap().proposal.weight_checkpoint.is_some());

    // Tokens acquired after creation carry no weight on this proposal.
    dao.token
        .mint(&actor("latecomer"), Amount::new(1_000_000 * TOKEN))
        .unwrap();
    assert!(matches!(
        dao.engine.vote_up(&actor("latecomer"), id).await,
        Err(GovernanceError::Unauthorized { .. })
    ));

    // Tokens moved after creation still count for the previous holder.
    dao.token
        .transfer(&actor("investor2"), &actor("latecomer"), Amount::new(200_000 * TOKEN))
        .await
        .unwrap();
    dao.engine.vote_up(&actor("investor2"), id).await.unwrap();
    assert_eq!(
        dao.engine.vote_record(&actor("investor2"), id).unwrap().weight,
        Amount::new(200_000 * TOKEN)
    );
}

#[tokio::test]
async fn events_follow_the_proposal_lifecycle() {
    let mut dao = dao();
    let mut rx = dao.engine.subscribe();

    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    for investor in ["investor1", "investor2", "investor3"] {
        dao.engine.vote_up(&actor(investor), id).await.unwrap();
    }
    // Rejected operations emit nothing.
    let _ = dao.engine.vote_up(&actor("investor1"), id).await;
    dao.engine.finalize(&actor("investor1"), id).await.unwrap();

    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        assert_eq!(event.proposal_id(), id);
        kinds.push(event.kind());
        if let GovernanceEvent::VoteCast { direction, weight, .. } = &event {
            assert_eq!(*direction, VoteDirection::Up);
            assert_eq!(*weight, Amount::new(200_000 * TOKEN));
        }
    }
    assert_eq!(
        kinds,
        vec![
            "proposal_created",
            "vote_cast",
            "vote_cast",
            "vote_cast",
            "proposal_finalized"
        ]
    );
    assert_eq!(dao.engine.events().counts().get("vote_cast"), Some(&3));
}

#[tokio::test]
async fn exported_state_restores_into_a_fresh_engine() {
    let mut dao = dao();
    for n in 1..=2 {
        let id = dao
            .engine
            .create_proposal(&actor("investor1"), draft(n, 100))
            .await
            .unwrap();
        dao.engine.vote_up(&actor("investor1"), id).await.unwrap();
        dao.engine.vote_down(&actor("investor2"), id).await.unwrap();
    }
    let json = dao.engine.export_state().to_json().unwrap();

    let mut restored = GovernanceEngine::new(
        params(QuorumPolicy::Approval, WeightPolicy::Live),
        GovernanceLedgers::new(dao.token.clone(), dao.usdc.clone()),
    )
    .unwrap()
    .restore(GovernanceState::from_json(&json).unwrap())
    .unwrap();

    assert_eq!(restored.proposal_count(), 2);
    assert_eq!(restored.proposals(), dao.engine.proposals());
    assert!(matches!(
        restored.vote_up(&actor("investor1"), ProposalId::new(2)).await,
        Err(GovernanceError::AlreadyVoted { .. })
    ));

    let next = restored
        .create_proposal(&actor("investor3"), draft(3, 100))
        .await
        .unwrap();
    assert_eq!(next, ProposalId::new(3));
}

#[tokio::test]
async fn tampered_state_is_refused() {
    let mut dao = dao();
    let id = dao
        .engine
        .create_proposal(&actor("investor1"), draft(1, 100))
        .await
        .unwrap();
    dao.engine.vote_up(&actor("investor1"), id).await.unwrap();

    let mut state = dao.engine.export_state();
    state.votes.clear();

    let result = GovernanceEngine::new(
        params(QuorumPolicy::Approval, WeightPolicy::Live),
        GovernanceLedgers::new(dao.token.clone(), dao.usdc.clone()),
    )
    .unwrap()
    .restore(state);
    assert!(matches!(result, Err(StateError::InconsistentTally(_))));
}

#[tokio::test]
async fn restore_into_populated_engine_is_refused() {
    let mut dao = dao();
    for n in 1..=2 {
        dao.engine
            .create_proposal(&actor("investor1"), draft(n, 100))
            .await
            .unwrap();
    }

    let result = dao.engine.restore(GovernanceState::default());
    assert!(matches!(
        result,
        Err(StateError::EngineNotEmpty { proposals: 2 })
    ));
}

#[tokio::test]
async fn restored_engine_continues_the_id_sequence() {
    let mut dao = dao();
    for n in 1..=2 {
        dao.engine
            .create_proposal(&actor("investor1"), draft(n, 100))
            .await
            .unwrap();
    }
    let state = dao.engine.export_state();

    let mut restored = GovernanceEngine::new(
        params(QuorumPolicy::Approval, WeightPolicy::Live),
        GovernanceLedgers::new(dao.token.clone(), dao.usdc.clone()),
    )
    .unwrap()
    .restore(state.clone())
    .unwrap();

    let next = restored
        .create_proposal(&actor("investor2"), draft(3, 100))
        .await
        .unwrap();
    assert_eq!(next, ProposalId::new(3));

    // A second restore would rewind the counter.
    assert!(matches!(
        restored.restore(state),
        Err(StateError::EngineNotEmpty { proposals: 3 })
    ));
}
