use crate::registry::IdentityRegistry;
use coeo_crypto::ProofVerifier;
use coeo_types::{
    CoeoError, CoeoResult, ExternalNullifier, MerkleRoot, NullifierHash, Proof, PublicInputs,
    SignalHash,
};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Range checks and root lookup in front of the circuit verifier.
pub struct ProofGateway {
    verifier: Box<dyn ProofVerifier>,
    verifications_passed: AtomicU64,
    verifications_failed: AtomicU64,
}

impl ProofGateway {
    pub fn new(verifier: Box<dyn ProofVerifier>) -> Self {
        Self {
            verifier,
            verifications_passed: AtomicU64::new(0),
            verifications_failed: AtomicU64::new(0),
        }
    }

    /// Read-only: succeeds only when the proof binds the four public inputs
    /// under a root the registry has produced.
    pub fn verify(
        &self,
        registry: &IdentityRegistry,
        root: &MerkleRoot,
        nullifier_hash: &NullifierHash,
        signal_hash: &SignalHash,
        external_nullifier: &ExternalNullifier,
        proof: &Proof,
    ) -> CoeoResult<()> {
        let result = self.check(
            registry,
            root,
            nullifier_hash,
            signal_hash,
            external_nullifier,
            proof,
        );
        match &result {
            Ok(()) => {
                self.verifications_passed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.verifications_failed.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Proof rejected");
            }
        }
        result
    }

    fn check(
        &self,
        registry: &IdentityRegistry,
        root: &MerkleRoot,
        nullifier_hash: &NullifierHash,
        signal_hash: &SignalHash,
        external_nullifier: &ExternalNullifier,
        proof: &Proof,
    ) -> CoeoResult<()> {
        nullifier_hash.ensure_in_field("nullifiers hash")?;
        proof.validate()?;
        if !registry.contains_root(root) {
            return Err(CoeoError::RootNotSeen);
        }

        let inputs = PublicInputs::new(*root, *nullifier_hash, *signal_hash, *external_nullifier);
        if self.verifier.verify(&inputs, proof)? {
            Ok(())
        } else {
            Err(CoeoError::InvalidProof)
        }
    }

    pub fn stats(&self) -> (u64, u64) {
        (
            self.verifications_passed.load(Ordering::Relaxed),
            self.verifications_failed.load(Ordering::Relaxed),
        )
    }
}
