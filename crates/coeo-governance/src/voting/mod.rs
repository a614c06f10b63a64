mod calls;
mod engine;
mod proposal;

pub use calls::{GovernanceCall, SignalKind, SignalWitness};
pub use engine::SemaphoreVoting;
pub use proposal::{is_proposal_topic, proposal_topic, Proposal, ProposalDraft};
