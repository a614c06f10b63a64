use super::proposal::{proposal_topic, ProposalDraft};
use coeo_types::{
    Address, CoeoError, CoeoResult, ExternalNullifier, MerkleRoot, NullifierHash, Proof,
    VoteChoice,
};
use serde::{Deserialize, Serialize};

/// Calls a proposal may make on the engine that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceCall {
    AddMember(Address),
    AddExternalNullifier(ExternalNullifier),
    DeactivateExternalNullifier(ExternalNullifier),
    ReactivateExternalNullifier(ExternalNullifier),
    SetPermissioning(bool),
}

impl GovernanceCall {
    pub fn encode(&self) -> CoeoResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CoeoError::Serialization(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> CoeoResult<Self> {
        bincode::deserialize(bytes).map_err(|e| {
            CoeoError::ExecutionFailed(format!("undecodable governance call: {}", e))
        })
    }
}

/// Proof material shared by every broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalWitness {
    pub proof: Proof,
    pub root: MerkleRoot,
    pub nullifier_hash: NullifierHash,
}

impl SignalWitness {
    pub fn new(proof: Proof, root: MerkleRoot, nullifier_hash: NullifierHash) -> Self {
        Self {
            proof,
            root,
            nullifier_hash,
        }
    }
}

/// What a proof-carrying broadcast means to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    Plain {
        external_nullifier: ExternalNullifier,
        signal: Vec<u8>,
    },
    Proposal {
        proposal_id: u64,
        draft: ProposalDraft,
    },
    Vote {
        proposal_id: u64,
        choice: VoteChoice,
    },
}

impl SignalKind {
    /// Bytes whose hash the proof commits to.
    pub fn signal(&self) -> &[u8] {
        match self {
            SignalKind::Plain { signal, .. } => signal,
            SignalKind::Proposal { draft, .. } => &draft.metadata,
            SignalKind::Vote { choice, .. } => choice.signal(),
        }
    }

    pub fn external_nullifier(&self) -> ExternalNullifier {
        match self {
            SignalKind::Plain {
                external_nullifier, ..
            } => *external_nullifier,
            SignalKind::Proposal { proposal_id, .. } | SignalKind::Vote { proposal_id, .. } => {
                proposal_topic(*proposal_id)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SignalKind::Plain { .. } => "signal",
            SignalKind::Proposal { .. } => "proposal",
            SignalKind::Vote { .. } => "vote",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coeo_types::FieldElement;

    #[test]
    fn test_governance_call_encoding() {
        let call = GovernanceCall::AddMember(Address::from_low_u64(77));
        let bytes = call.encode().unwrap();
        assert_eq!(GovernanceCall::decode(&bytes).unwrap(), call);

        let call = GovernanceCall::DeactivateExternalNullifier(FieldElement::from(12u64));
        let bytes = call.encode().unwrap();
        assert_eq!(GovernanceCall::decode(&bytes).unwrap(), call);
    }

    #[test]
    fn test_garbage_is_execution_failure() {
        assert!(matches!(
            GovernanceCall::decode(&[0xde, 0xad, 0xbe, 0xef, 0xff]),
            Err(CoeoError::ExecutionFailed(_))
        ));
    }

    #[test]
    fn test_kind_topics_and_signals() {
        let vote = SignalKind::Vote {
            proposal_id: 3,
            choice: VoteChoice::No,
        };
        assert_eq!(vote.signal(), b"NAY");
        assert_eq!(vote.external_nullifier(), FieldElement::from(3u64));

        let proposal = SignalKind::Proposal {
            proposal_id: 0,
            draft: ProposalDraft {
                metadata: b"Send 1 ETH".to_vec(),
                execution_data: Vec::new(),
                target: Address::from_low_u64(5),
                value: 0,
            },
        };
        assert_eq!(proposal.signal(), b"Send 1 ETH");
        assert_eq!(proposal.external_nullifier(), FieldElement::ZERO);
        assert_eq!(proposal.name(), "proposal");
    }
}
