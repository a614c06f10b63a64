use coeo_types::{Address, ExternalNullifier, FieldElement, Fraction, ProposalStatus, VoteChoice};
use serde::{Deserialize, Serialize};

/// The proposer-chosen part of a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    /// Human readable description; also the signal the proposer proves over.
    pub metadata: Vec<u8>,
    pub execution_data: Vec<u8>,
    pub target: Address,
    pub value: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub metadata: Vec<u8>,
    pub execution_data: Vec<u8>,
    pub target: Address,
    pub value: u128,
    pub created_at: u64,
    pub deadline: u64,
    pub yes_weight: u64,
    pub no_weight: u64,
    pub executed: bool,
}

/// Each proposal votes under its own external nullifier, equal to its id.
pub fn proposal_topic(proposal_id: u64) -> ExternalNullifier {
    FieldElement::from(proposal_id)
}

/// Proposal ids fill the `u64` range of external nullifiers. Every other
/// topic must sit above it.
pub fn is_proposal_topic(external_nullifier: &ExternalNullifier) -> bool {
    external_nullifier.to_u64().is_some()
}

impl Proposal {
    pub(crate) fn open(id: u64, draft: ProposalDraft, now: u64, epoch_secs: u64) -> Self {
        Self {
            id,
            metadata: draft.metadata,
            execution_data: draft.execution_data,
            target: draft.target,
            value: draft.value,
            created_at: now,
            deadline: now.saturating_add(epoch_secs),
            yes_weight: 0,
            no_weight: 0,
            executed: false,
        }
    }

    pub fn topic(&self) -> ExternalNullifier {
        proposal_topic(self.id)
    }

    pub fn status(&self, now: u64) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if now > self.deadline {
            ProposalStatus::Expired
        } else {
            ProposalStatus::Pending
        }
    }

    pub fn votes_cast(&self) -> u64 {
        self.yes_weight + self.no_weight
    }

    pub(crate) fn tally(&mut self, choice: VoteChoice) {
        match choice {
            VoteChoice::Yes => self.yes_weight += 1,
            VoteChoice::No => self.no_weight += 1,
        }
    }

    /// Participation against `enrolled` and YES share of the votes cast.
    pub fn thresholds_met(&self, quorum: Fraction, approval: Fraction, enrolled: u64) -> bool {
        let cast = self.votes_cast();
        quorum.is_met(cast, enrolled) && approval.is_met(self.yes_weight, cast)
    }
}
