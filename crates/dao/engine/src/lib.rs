//! Token-weighted treasury governance.
//!
//! Holders of a governance token create spending proposals against a treasury
//! held in a second asset, vote on them with weight equal to their token
//! balance, and finalize a proposal once its tally strictly exceeds a fixed
//! quorum. Finalization pays the proposal amount out of the treasury exactly
//! once.
//!
//! Balances are never stored here: both assets live in external ledgers
//! reached through [`AssetLedger`]. [`InMemoryAssetLedger`] is the bundled
//! adapter used by tests and the replay tool.
//!
//! ```ignore
//! let ledgers = GovernanceLedgers::new(token_ledger, usdc_ledger);
//! let mut engine = GovernanceEngine::new(params, ledgers)?;
//! let id = engine.create_proposal(&investor, draft).await?;
//! engine.vote_up(&investor, id).await?;
//! engine.finalize(&investor, id).await?;
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod oracle;
pub mod quorum;
pub mod registry;
pub mod state;
pub mod treasury;
pub mod voting;

pub use config::{ConfigError, EventsConfig, GovernanceConfig, LoggingConfig};
pub use engine::{GovernanceEngine, GovernanceLedgers};
pub use events::{EventBus, DEFAULT_EVENT_CAPACITY};
pub use ledger::{AssetLedger, HistoricalLedger, InMemoryAssetLedger, TransferOutcome};
pub use oracle::EligibilityOracle;
pub use quorum::QuorumEvaluator;
pub use registry::{ProposalDraft, ProposalRegistry};
pub use state::{GovernanceState, StateError, VoteEntry};
pub use treasury::Treasury;
pub use voting::VotingLedger;

pub use dao_types::*;
