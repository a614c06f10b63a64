//! Poseidon over the BN254 scalar field.
//!
//! Every commitment, nullifier hash and Merkle node in Coeo is produced here.
//!
//! ## Parameters
//! - Width 3 (rate 2, capacity 1)
//! - 8 full rounds, 57 partial rounds
//! - S-box x^5
//! - Round constants and MDS from the Grain LFSR (arkworks)
//!
//! The output is the first squeezed element.

use crate::field::{from_fr, to_fr};
use ark_bn254::Fr;
use ark_crypto_primitives::sponge::{
    poseidon::{find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge},
    CryptographicSponge,
};
use coeo_types::{CoeoResult, FieldElement};
use std::sync::OnceLock;

static POSEIDON_CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();

pub fn poseidon_config() -> &'static PoseidonConfig<Fr> {
    POSEIDON_CONFIG.get_or_init(|| {
        let rate = 2;
        let alpha = 5u64;
        let full_rounds = 8;
        let partial_rounds = 57;

        let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(254, rate, full_rounds, partial_rounds, 0);

        PoseidonConfig {
            full_rounds: full_rounds as usize,
            partial_rounds: partial_rounds as usize,
            alpha,
            ark,
            mds,
            rate,
            capacity: 1,
        }
    })
}

pub fn hash_fields(inputs: &[Fr]) -> Fr {
    let mut sponge = PoseidonSponge::new(poseidon_config());
    for input in inputs {
        sponge.absorb(input);
    }
    let output: Vec<Fr> = sponge.squeeze_field_elements(1);
    output[0]
}

pub fn hash1(input: Fr) -> Fr {
    hash_fields(&[input])
}

/// Merkle node and nullifier hash primitive.
pub fn hash2(left: Fr, right: Fr) -> Fr {
    hash_fields(&[left, right])
}

/// Wire-level two-to-one hash; fails if either input is not a field element.
pub fn hash2_elements(left: &FieldElement, right: &FieldElement) -> CoeoResult<FieldElement> {
    Ok(from_fr(&hash2(to_fr(left)?, to_fr(right)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coeo_types::SNARK_SCALAR_FIELD_BYTES;

    #[test]
    fn test_hash_deterministic() {
        let a = Fr::from(12345u64);
        let b = Fr::from(67890u64);

        assert_eq!(hash2(a, b), hash2(a, b));
        // Order matters
        assert_ne!(hash2(a, b), hash2(b, a));
    }

    #[test]
    fn test_arity_separates_outputs() {
        let a = Fr::from(7u64);
        assert_ne!(hash1(a), hash2(a, Fr::from(0u64)));
    }

    #[test]
    fn test_hash2_elements() {
        let left = FieldElement::from(1u64);
        let right = FieldElement::from(2u64);
        let out = hash2_elements(&left, &right).unwrap();
        assert!(out.is_in_field());
        assert_eq!(out, from_fr(&hash2(Fr::from(1u64), Fr::from(2u64))));

        let bad = FieldElement(SNARK_SCALAR_FIELD_BYTES);
        assert!(hash2_elements(&bad, &right).is_err());
    }
}
