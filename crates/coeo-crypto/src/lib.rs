#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod field;
pub mod groth16;
pub mod identity;
pub mod keccak;
pub mod merkle;
pub mod poseidon;
pub mod verifier;

pub use field::{from_fr, to_fr};
pub use groth16::{decode_proof, encode_proof, Groth16Verifier, PUBLIC_INPUT_COUNT};
pub use identity::{Identity, IdentitySecrets};
pub use keccak::{
    derive_address, external_nullifier_from_text, keccak256, nothing_up_my_sleeve, signal_hash,
};
pub use merkle::{IncrementalMerkleTree, MerklePath};
pub use poseidon::{hash1, hash2, hash2_elements, hash_fields, poseidon_config};
pub use verifier::ProofVerifier;
