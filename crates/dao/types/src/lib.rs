#![deny(unsafe_code)]
//! Shared value types for the token-weighted treasury governance engine.
//!
//! This crate provides:
//! - **Fixed-point amounts** ([`Amount`]) serialised as decimal strings.
//! - **Identities and asset references** ([`ActorId`], [`ProposalId`], [`AssetRef`]).
//! - **Proposal and vote records** ([`Proposal`], [`VoteRecord`], [`ProposalSnapshot`]).
//! - **Governance parameters** ([`GovernanceParams`], [`QuorumPolicy`], [`WeightPolicy`]).
//! - **Notifications** emitted by the engine ([`GovernanceEvent`]).
//! - **Error taxonomy** separating domain rejections from ledger faults
//!   ([`GovernanceError`], [`LedgerError`]).

pub mod amount;
pub mod error;
pub mod event;
pub mod ids;
pub mod params;
pub mod proposal;

pub use amount::{Amount, AmountParseError};
pub use error::{GovernanceError, LedgerError};
pub use event::GovernanceEvent;
pub use ids::{ActorId, AssetRef, ProposalId};
pub use params::{GovernanceParams, QuorumPolicy, WeightPolicy};
pub use proposal::{Proposal, ProposalSnapshot, ProposalStatus, VoteDirection, VoteRecord};
