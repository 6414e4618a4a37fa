//! Quorum evaluation.
//!
//! Pure and deterministic: the verdict depends only on the proposal's tallies
//! and the threshold fixed at construction. The boundary is exclusive; a tally
//! equal to the threshold does not meet quorum.

use dao_types::{Amount, Proposal, QuorumPolicy};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuorumEvaluator {
    threshold: Amount,
    policy: QuorumPolicy,
}

impl QuorumEvaluator {
    pub const fn new(threshold: Amount, policy: QuorumPolicy) -> Self {
        Self { threshold, policy }
    }

    pub const fn threshold(&self) -> Amount {
        self.threshold
    }

    pub const fn policy(&self) -> QuorumPolicy {
        self.policy
    }

    /// The tally the policy compares against the threshold.
    pub fn tally(&self, proposal: &Proposal) -> Amount {
        match self.policy {
            QuorumPolicy::Approval => proposal.up_votes,
            QuorumPolicy::Participation => proposal.votes,
        }
    }

    pub fn meets_quorum(&self, proposal: &Proposal) -> bool {
        self.tally(proposal) > self.threshold
    }
}
