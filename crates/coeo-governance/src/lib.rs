#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod events;
pub mod external_nullifiers;
pub mod factory;
pub mod gateway;
pub mod nullifier_ledger;
pub mod registry;
pub mod semaphore;
pub mod service;
pub mod target;
pub mod telemetry;
pub mod voting;
pub mod wallet;

#[cfg(test)]
mod test_support;

pub use config::{
    CoeoConfig, KeyFormat, LogFormat, LogLevel, LoggingConfig, OrganizationConfig, VerifierConfig,
};
pub use events::{Event, Receipt};
pub use external_nullifiers::ExternalNullifierChain;
pub use factory::{Organization, OrganizationAddresses, OrganizationFactory};
pub use gateway::ProofGateway;
pub use nullifier_ledger::NullifierLedger;
pub use registry::IdentityRegistry;
pub use semaphore::{Semaphore, SignalRequest};
pub use service::{OrganizationService, OrganizationSnapshot, ServiceStats, Transaction};
pub use target::{CallContext, ExecutionTarget, TxContext};
pub use telemetry::init_logging;
pub use voting::{
    is_proposal_topic, proposal_topic, GovernanceCall, Proposal, ProposalDraft, SemaphoreVoting, SignalKind,
    SignalWitness,
};
pub use wallet::{TransferRecord, Wallet, WalletCall};
