use crate::constants::{FIELD_ELEMENT_SIZE, SNARK_SCALAR_FIELD_BYTES};
use crate::error::{CoeoError, CoeoResult};
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 256-bit unsigned value as it travels on the wire (big-endian).
///
/// Values are not reduced on construction, so a caller can submit something
/// at or above the scalar field modulus and have it rejected explicitly.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldElement(pub [u8; FIELD_ELEMENT_SIZE]);

impl FieldElement {
    pub const ZERO: Self = Self([0u8; FIELD_ELEMENT_SIZE]);

    pub fn from_be_bytes(bytes: [u8; FIELD_ELEMENT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Left-pads slices shorter than 32 bytes.
    pub fn from_be_slice(bytes: &[u8]) -> CoeoResult<Self> {
        if bytes.len() > FIELD_ELEMENT_SIZE {
            return Err(CoeoError::Serialization(format!(
                "field element too long: {} bytes",
                bytes.len()
            )));
        }
        let mut arr = [0u8; FIELD_ELEMENT_SIZE];
        arr[FIELD_ELEMENT_SIZE - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn from_u64(value: u64) -> Self {
        let mut arr = [0u8; FIELD_ELEMENT_SIZE];
        arr[FIELD_ELEMENT_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
        Self(arr)
    }

    /// `Some` when the value fits in the low 8 bytes.
    pub fn to_u64(&self) -> Option<u64> {
        let (high, low) = self.0.split_at(FIELD_ELEMENT_SIZE - 8);
        if high.iter().any(|b| *b != 0) {
            return None;
        }
        let mut arr = [0u8; 8];
        arr.copy_from_slice(low);
        Some(u64::from_be_bytes(arr))
    }

    pub fn as_bytes(&self) -> &[u8; FIELD_ELEMENT_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; FIELD_ELEMENT_SIZE]
    }

    /// Strictly below the BN254 scalar field modulus.
    pub fn is_in_field(&self) -> bool {
        self.0 < SNARK_SCALAR_FIELD_BYTES
    }

    pub fn ensure_in_field(self, what: &str) -> CoeoResult<Self> {
        if self.is_in_field() {
            Ok(self)
        } else {
            Err(CoeoError::FieldOverflow(what.to_string()))
        }
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    pub fn from_biguint(value: &BigUint) -> CoeoResult<Self> {
        Self::from_be_slice(&value.to_bytes_be())
    }

    /// Wrapping is not allowed; returns `None` past 2^256.
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        let sum = self.to_biguint() + other.to_biguint();
        Self::from_biguint(&sum).ok()
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> CoeoResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let padded = if s.len() % 2 == 1 {
            format!("0{}", s)
        } else {
            s.to_string()
        };
        let bytes = hex::decode(&padded).map_err(|e| CoeoError::Serialization(e.to_string()))?;
        Self::from_be_slice(&bytes)
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl FromStr for FieldElement {
    type Err = CoeoError;

    /// Accepts decimal (snarkjs style) or `0x`-prefixed hex.
    fn from_str(s: &str) -> CoeoResult<Self> {
        let s = s.trim();
        if s.starts_with("0x") {
            return Self::from_hex(s);
        }
        let value = BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| {
            CoeoError::Serialization(format!("invalid decimal field element: {:?}", s))
        })?;
        Self::from_biguint(&value)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_biguint())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_hex())
    }
}

impl Serialize for FieldElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
