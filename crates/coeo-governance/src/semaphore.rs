use crate::events::Event;
use crate::external_nullifiers::ExternalNullifierChain;
use crate::gateway::ProofGateway;
use crate::nullifier_ledger::NullifierLedger;
use crate::registry::IdentityRegistry;
use coeo_crypto::signal_hash;
use coeo_types::{
    Address, CoeoError, CoeoResult, ExternalNullifier, IdentityCommitment, MerkleRoot,
    NullifierHash, Proof, SignalHash,
};
use tracing::{info, warn};

/// One proof-carrying signal, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct SignalRequest<'a> {
    pub signal: &'a [u8],
    pub proof: &'a Proof,
    pub root: MerkleRoot,
    pub nullifier_hash: NullifierHash,
    pub external_nullifier: ExternalNullifier,
}

/// Whether the signal's topic must already exist or is created by the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicMode {
    Existing,
    Appending,
}

/// Identity registry, topic chain and nullifier ledger behind one owner.
///
/// Every mutating call validates fully before touching state, so a failed
/// call leaves no trace.
pub struct Semaphore {
    address: Address,
    owner: Address,
    registry: IdentityRegistry,
    external_nullifiers: ExternalNullifierChain,
    ledger: NullifierLedger,
    gateway: ProofGateway,
    permissioned: bool,
    signals: Vec<Vec<u8>>,
}

impl Semaphore {
    pub fn new(
        address: Address,
        owner: Address,
        tree_depth: usize,
        first_external_nullifier: ExternalNullifier,
        gateway: ProofGateway,
    ) -> CoeoResult<Self> {
        let mut external_nullifiers = ExternalNullifierChain::new();
        external_nullifiers.append(first_external_nullifier)?;

        Ok(Self {
            address,
            owner,
            registry: IdentityRegistry::new(tree_depth)?,
            external_nullifiers,
            ledger: NullifierLedger::new(),
            gateway,
            permissioned: true,
            signals: Vec::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn external_nullifiers(&self) -> &ExternalNullifierChain {
        &self.external_nullifiers
    }

    pub fn ledger(&self) -> &NullifierLedger {
        &self.ledger
    }

    pub fn gateway(&self) -> &ProofGateway {
        &self.gateway
    }

    pub fn is_permissioned(&self) -> bool {
        self.permissioned
    }

    fn only_owner(&self, caller: &Address) -> CoeoResult<()> {
        if *caller != self.owner {
            return Err(CoeoError::PermissionDenied(format!(
                "caller {} is not the owner",
                caller
            )));
        }
        Ok(())
    }

    pub fn insert_identity(
        &mut self,
        caller: &Address,
        commitment: IdentityCommitment,
        events: &mut Vec<Event>,
    ) -> CoeoResult<MerkleRoot> {
        self.only_owner(caller)?;
        let root = self.registry.insert(commitment)?;
        events.push(Event::LeafInsertion {
            index: self.registry.count() - 1,
            commitment,
            root,
        });
        Ok(root)
    }

    pub fn add_external_nullifier(
        &mut self,
        caller: &Address,
        external_nullifier: ExternalNullifier,
        events: &mut Vec<Event>,
    ) -> CoeoResult<()> {
        self.only_owner(caller)?;
        self.external_nullifiers.append(external_nullifier)?;
        events.push(Event::ExternalNullifierAdd { external_nullifier });
        info!(external_nullifier = %external_nullifier, "External nullifier added");
        Ok(())
    }

    pub fn deactivate_external_nullifier(
        &mut self,
        caller: &Address,
        external_nullifier: &ExternalNullifier,
        events: &mut Vec<Event>,
    ) -> CoeoResult<()> {
        self.set_external_nullifier_status(caller, external_nullifier, false, events)
    }

    pub fn reactivate_external_nullifier(
        &mut self,
        caller: &Address,
        external_nullifier: &ExternalNullifier,
        events: &mut Vec<Event>,
    ) -> CoeoResult<()> {
        self.set_external_nullifier_status(caller, external_nullifier, true, events)
    }

    fn set_external_nullifier_status(
        &mut self,
        caller: &Address,
        external_nullifier: &ExternalNullifier,
        active: bool,
        events: &mut Vec<Event>,
    ) -> CoeoResult<()> {
        self.only_owner(caller)?;
        if active {
            self.external_nullifiers.reactivate(external_nullifier)?;
        } else {
            self.external_nullifiers.deactivate(external_nullifier)?;
        }
        events.push(Event::ExternalNullifierStatus {
            external_nullifier: *external_nullifier,
            active,
        });
        Ok(())
    }

    pub fn set_permissioning(
        &mut self,
        caller: &Address,
        enabled: bool,
        events: &mut Vec<Event>,
    ) -> CoeoResult<()> {
        self.only_owner(caller)?;
        self.permissioned = enabled;
        events.push(Event::PermissioningSet { enabled });
        info!(enabled, "Broadcast permissioning updated");
        Ok(())
    }

    /// Gated broadcast on an existing, active topic.
    pub fn broadcast_signal(
        &mut self,
        caller: &Address,
        request: &SignalRequest<'_>,
        events: &mut Vec<Event>,
    ) -> CoeoResult<u64> {
        if self.permissioned && *caller != self.owner {
            warn!(caller = %caller, "Broadcast permission denied");
            return Err(CoeoError::PermissionDenied(
                "broadcast permission denied".into(),
            ));
        }
        self.check_signal(request, TopicMode::Existing)?;
        self.commit_signal(request, TopicMode::Existing, events)?;
        Ok(self.record_signal(request, events))
    }

    /// Read-only dry run of a broadcast: hash binding, replay and proof.
    pub fn pre_broadcast_check(
        &self,
        signal: &[u8],
        proof: &Proof,
        root: &MerkleRoot,
        nullifier_hash: &NullifierHash,
        signal_hash_claimed: &SignalHash,
        external_nullifier: &ExternalNullifier,
    ) -> bool {
        signal_hash(signal) == *signal_hash_claimed
            && !self.ledger.is_consumed(external_nullifier, nullifier_hash)
            && self
                .gateway
                .verify(
                    &self.registry,
                    root,
                    nullifier_hash,
                    signal_hash_claimed,
                    external_nullifier,
                    proof,
                )
                .is_ok()
    }

    /// Every check a signal must pass, with no mutation.
    pub(crate) fn check_signal(
        &self,
        request: &SignalRequest<'_>,
        mode: TopicMode,
    ) -> CoeoResult<()> {
        let en = &request.external_nullifier;
        match mode {
            TopicMode::Existing => {
                if !self.external_nullifiers.contains(en) {
                    return Err(CoeoError::NotFound(format!("external nullifier {}", en)));
                }
                if !self.external_nullifiers.is_active(en) {
                    return Err(CoeoError::Inactive(en.to_string()));
                }
            }
            TopicMode::Appending => {
                if self.external_nullifiers.contains(en) {
                    return Err(CoeoError::AlreadyExists(format!(
                        "external nullifier {}",
                        en
                    )));
                }
            }
        }

        self.gateway.verify(
            &self.registry,
            &request.root,
            &request.nullifier_hash,
            &signal_hash(request.signal),
            en,
            request.proof,
        )?;
        self.ledger.check(en, &request.nullifier_hash)
    }

    /// Applies a signal that already passed `check_signal`.
    pub(crate) fn commit_signal(
        &mut self,
        request: &SignalRequest<'_>,
        mode: TopicMode,
        events: &mut Vec<Event>,
    ) -> CoeoResult<()> {
        if mode == TopicMode::Appending {
            self.external_nullifiers.append(request.external_nullifier)?;
            events.push(Event::ExternalNullifierAdd {
                external_nullifier: request.external_nullifier,
            });
        }
        self.ledger
            .consume(request.external_nullifier, request.nullifier_hash);
        Ok(())
    }

    pub(crate) fn record_signal(
        &mut self,
        request: &SignalRequest<'_>,
        events: &mut Vec<Event>,
    ) -> u64 {
        let index = self.signals.len() as u64;
        self.signals.push(request.signal.to_vec());
        events.push(Event::SignalBroadcast {
            signal_index: index,
            external_nullifier: request.external_nullifier,
            nullifier_hash: request.nullifier_hash,
        });
        index
    }

    pub fn next_signal_index(&self) -> u64 {
        self.signals.len() as u64
    }

    pub fn signal(&self, index: u64) -> Option<&[u8]> {
        self.signals.get(index as usize).map(Vec::as_slice)
    }
}
