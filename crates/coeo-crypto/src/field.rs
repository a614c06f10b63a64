use ark_bn254::{Fq, Fr};
use ark_ff::{BigInt, BigInteger, PrimeField};
use coeo_types::{CoeoError, CoeoResult, FieldElement};

/// Scalar field element from its wire form. Values `>= r` are rejected, not reduced.
pub fn to_fr(value: &FieldElement) -> CoeoResult<Fr> {
    let big = BigInt::<4>::try_from(value.to_biguint())
        .map_err(|_| CoeoError::FieldOverflow(value.to_hex()))?;
    Fr::from_bigint(big).ok_or_else(|| CoeoError::FieldOverflow(value.to_hex()))
}

pub fn from_fr(value: &Fr) -> FieldElement {
    to_field_element(value.into_bigint().to_bytes_be())
}

/// Base field coordinate (curve points), rejected when `>= q`.
pub fn to_fq(value: &FieldElement) -> CoeoResult<Fq> {
    let big = BigInt::<4>::try_from(value.to_biguint())
        .map_err(|_| CoeoError::MalformedProof(value.to_hex()))?;
    Fq::from_bigint(big).ok_or_else(|| CoeoError::MalformedProof(value.to_hex()))
}

pub fn from_fq(value: &Fq) -> FieldElement {
    to_field_element(value.into_bigint().to_bytes_be())
}

fn to_field_element(bytes: Vec<u8>) -> FieldElement {
    let mut arr = [0u8; 32];
    let offset = 32usize.saturating_sub(bytes.len());
    arr[offset..].copy_from_slice(&bytes[bytes.len().saturating_sub(32)..]);
    FieldElement(arr)
}
