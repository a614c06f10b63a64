use crate::constants::PROOF_ELEMENT_COUNT;
use crate::error::{CoeoError, CoeoResult};
use crate::field::FieldElement;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Groth16 proof in Solidity verifier order:
/// `[a.x, a.y, b.x.c1, b.x.c0, b.y.c1, b.y.c0, c.x, c.y]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proof(pub [FieldElement; PROOF_ELEMENT_COUNT]);

impl Proof {
    pub fn new(elements: [FieldElement; PROOF_ELEMENT_COUNT]) -> Self {
        Self(elements)
    }

    pub fn elements(&self) -> &[FieldElement; PROOF_ELEMENT_COUNT] {
        &self.0
    }

    /// Every element must be a canonical scalar field element.
    pub fn validate(&self) -> CoeoResult<()> {
        for (i, element) in self.0.iter().enumerate() {
            if !element.is_in_field() {
                return Err(CoeoError::MalformedProof(format!(
                    "element {} is not lt the snark scalar field",
                    i
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<FieldElement>> for Proof {
    type Error = CoeoError;

    fn try_from(elements: Vec<FieldElement>) -> CoeoResult<Self> {
        let len = elements.len();
        let arr: [FieldElement; PROOF_ELEMENT_COUNT] = elements.try_into().map_err(|_| {
            CoeoError::MalformedProof(format!(
                "expected {} elements, got {}",
                PROOF_ELEMENT_COUNT, len
            ))
        })?;
        Ok(Self(arr))
    }
}

impl TryFrom<&[FieldElement]> for Proof {
    type Error = CoeoError;

    fn try_from(elements: &[FieldElement]) -> CoeoResult<Self> {
        Self::try_from(elements.to_vec())
    }
}

impl fmt::Debug for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proof({}...)", &self.0[0].to_hex()[..10])
    }
}

/// Public signals bound by the membership circuit, in circuit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicInputs {
    pub root: FieldElement,
    pub nullifier_hash: FieldElement,
    pub signal_hash: FieldElement,
    pub external_nullifier: FieldElement,
}

impl PublicInputs {
    pub fn new(
        root: FieldElement,
        nullifier_hash: FieldElement,
        signal_hash: FieldElement,
        external_nullifier: FieldElement,
    ) -> Self {
        Self {
            root,
            nullifier_hash,
            signal_hash,
            external_nullifier,
        }
    }

    pub fn to_array(&self) -> [FieldElement; 4] {
        [
            self.root,
            self.nullifier_hash,
            self.signal_hash,
            self.external_nullifier,
        ]
    }
}
