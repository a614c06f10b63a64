use coeo_types::{
    Address, CoeoError, CoeoResult, ExternalNullifier, IdentityCommitment, MerkleRoot,
    NullifierHash, VoteChoice,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    NewOrganization {
        semaphore: Address,
        voting: Address,
        wallet: Address,
    },
    IdentityAdded {
        member: Address,
        commitment: IdentityCommitment,
    },
    LeafInsertion {
        index: u64,
        commitment: IdentityCommitment,
        root: MerkleRoot,
    },
    MemberAdded {
        member: Address,
    },
    ExternalNullifierAdd {
        external_nullifier: ExternalNullifier,
    },
    ExternalNullifierStatus {
        external_nullifier: ExternalNullifier,
        active: bool,
    },
    PermissioningSet {
        enabled: bool,
    },
    SignalBroadcast {
        signal_index: u64,
        external_nullifier: ExternalNullifier,
        nullifier_hash: NullifierHash,
    },
    SignalBroadcastByClient {
        signal_index: u64,
        signal: Vec<u8>,
    },
    VoteInitiated {
        proposal_id: u64,
        target: Address,
        value: u128,
        deadline: u64,
    },
    VoteBroadcast {
        proposal_id: u64,
        choice: VoteChoice,
    },
    VoteExecuted {
        proposal_id: u64,
        yes_weight: u64,
        no_weight: u64,
    },
    ExecutionFailed {
        proposal_id: u64,
        reason: String,
    },
    ProposalPruned {
        proposal_id: u64,
    },
    Deposit {
        from: Address,
        amount: u128,
    },
    Transfer {
        to: Address,
        value: u128,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::NewOrganization { .. } => "NewOrganization",
            Event::IdentityAdded { .. } => "IdentityAdded",
            Event::LeafInsertion { .. } => "LeafInsertion",
            Event::MemberAdded { .. } => "MemberAdded",
            Event::ExternalNullifierAdd { .. } => "ExternalNullifierAdd",
            Event::ExternalNullifierStatus { .. } => "ExternalNullifierStatus",
            Event::PermissioningSet { .. } => "PermissioningSet",
            Event::SignalBroadcast { .. } => "SignalBroadcast",
            Event::SignalBroadcastByClient { .. } => "SignalBroadcastByClient",
            Event::VoteInitiated { .. } => "VoteInitiated",
            Event::VoteBroadcast { .. } => "VoteBroadcast",
            Event::VoteExecuted { .. } => "VoteExecuted",
            Event::ExecutionFailed { .. } => "ExecutionFailed",
            Event::ProposalPruned { .. } => "ProposalPruned",
            Event::Deposit { .. } => "Deposit",
            Event::Transfer { .. } => "Transfer",
        }
    }
}

/// Outcome of one state-changing call.
///
/// `execution` is set only when the call finalized a proposal; an `Err` there
/// does not undo anything else recorded in `events`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Receipt {
    pub events: Vec<Event>,
    pub execution: Option<CoeoResult<()>>,
}

impl Receipt {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            execution: None,
        }
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.events.iter().any(|e| e.name() == name)
    }

    pub fn executed(&self) -> bool {
        self.execution.is_some()
    }

    pub fn execution_error(&self) -> Option<&CoeoError> {
        match &self.execution {
            Some(Err(e)) => Some(e),
            _ => None,
        }
    }
}
