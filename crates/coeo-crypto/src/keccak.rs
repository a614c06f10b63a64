use coeo_types::{Address, CoeoResult, FieldElement, SENTINEL_SEED, SNARK_SCALAR_FIELD_BYTES};
use num_bigint::BigUint;
use sha3::{Digest, Keccak256};
use std::sync::OnceLock;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// `keccak256(signal) >> 8`, so the result always fits the scalar field.
pub fn signal_hash(signal: &[u8]) -> FieldElement {
    let digest = keccak256(signal);
    let mut out = [0u8; 32];
    out[1..].copy_from_slice(&digest[..31]);
    FieldElement(out)
}

/// Topic id derived from plaintext: the low 29 bytes of `keccak256(text)`.
pub fn external_nullifier_from_text(text: &str) -> FieldElement {
    let mut digest = keccak256(text.as_bytes());
    digest[..3].fill(0);
    FieldElement(digest)
}

static SENTINEL: OnceLock<FieldElement> = OnceLock::new();

/// Nothing-up-my-sleeve value: `keccak256("Semaphore") mod r`.
///
/// Used as the empty leaf of the identity tree and never accepted as a commitment.
pub fn nothing_up_my_sleeve() -> FieldElement {
    *SENTINEL.get_or_init(|| {
        let digest = BigUint::from_bytes_be(&keccak256(SENTINEL_SEED));
        let modulus = BigUint::from_bytes_be(&SNARK_SCALAR_FIELD_BYTES);
        let reduced = (digest % modulus).to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - reduced.len()..].copy_from_slice(&reduced);
        FieldElement(out)
    })
}

/// Account address for the `nonce`-th object created by `deployer`.
pub fn derive_address(deployer: &Address, nonce: u64) -> CoeoResult<Address> {
    let mut preimage = Vec::with_capacity(28);
    preimage.extend_from_slice(deployer.as_bytes());
    preimage.extend_from_slice(&nonce.to_be_bytes());
    Address::from_digest_tail(&keccak256(&preimage))
}
