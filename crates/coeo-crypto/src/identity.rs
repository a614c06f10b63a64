use crate::field::{from_fr, to_fr};
use crate::poseidon::{hash1, hash2};
use ark_bn254::Fr;
use ark_std::UniformRand;
use coeo_types::{CoeoResult, FieldElement};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-side identity secrets.
///
/// `commitment = H1(H2(nullifier, trapdoor))` is what gets enrolled;
/// `nullifier_hash(en) = H2(en, nullifier)` is what a signal reveals.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    nullifier: Fr,
    trapdoor: Fr,
}

impl Identity {
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            nullifier: Fr::rand(&mut rng),
            trapdoor: Fr::rand(&mut rng),
        }
    }

    pub fn from_secrets(nullifier: &FieldElement, trapdoor: &FieldElement) -> CoeoResult<Self> {
        Ok(Self {
            nullifier: to_fr(nullifier)?,
            trapdoor: to_fr(trapdoor)?,
        })
    }

    pub fn nullifier(&self) -> FieldElement {
        from_fr(&self.nullifier)
    }

    pub fn trapdoor(&self) -> FieldElement {
        from_fr(&self.trapdoor)
    }

    pub fn secret(&self) -> Fr {
        hash2(self.nullifier, self.trapdoor)
    }

    pub fn commitment(&self) -> FieldElement {
        from_fr(&hash1(self.secret()))
    }

    pub fn nullifier_hash(&self, external_nullifier: &FieldElement) -> CoeoResult<FieldElement> {
        let en = to_fr(external_nullifier)?;
        Ok(from_fr(&hash2(en, self.nullifier)))
    }

    pub fn export(&self) -> IdentitySecrets {
        IdentitySecrets {
            nullifier: self.nullifier(),
            trapdoor: self.trapdoor(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity(commitment={})", self.commitment().to_hex())
    }
}

/// Serializable form of an identity, for client storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySecrets {
    pub nullifier: FieldElement,
    pub trapdoor: FieldElement,
}

impl TryFrom<&IdentitySecrets> for Identity {
    type Error = coeo_types::CoeoError;

    fn try_from(secrets: &IdentitySecrets) -> CoeoResult<Self> {
        Identity::from_secrets(&secrets.nullifier, &secrets.trapdoor)
    }
}
