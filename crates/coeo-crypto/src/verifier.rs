use coeo_types::{CoeoResult, Proof, PublicInputs};

/// Circuit-specific proof check.
///
/// `Ok(false)` means the proof is well formed but does not verify; `Err` is
/// reserved for inputs the backend cannot interpret.
pub trait ProofVerifier: Send + Sync {
    fn verify(&self, inputs: &PublicInputs, proof: &Proof) -> CoeoResult<bool>;
}

impl<T: ProofVerifier + ?Sized> ProofVerifier for Box<T> {
    fn verify(&self, inputs: &PublicInputs, proof: &Proof) -> CoeoResult<bool> {
        (**self).verify(inputs, proof)
    }
}

impl<T: ProofVerifier + ?Sized> ProofVerifier for std::sync::Arc<T> {
    fn verify(&self, inputs: &PublicInputs, proof: &Proof) -> CoeoResult<bool> {
        (**self).verify(inputs, proof)
    }
}
