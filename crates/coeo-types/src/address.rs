use crate::constants::ADDRESS_SIZE;
use crate::error::{CoeoError, CoeoResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Account identifier for members, owners and execution targets.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; ADDRESS_SIZE]);

impl Address {
    pub fn from_bytes(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Keeps the trailing 20 bytes of a longer digest.
    pub fn from_digest_tail(digest: &[u8]) -> CoeoResult<Self> {
        if digest.len() < ADDRESS_SIZE {
            return Err(CoeoError::Serialization(format!(
                "digest too short for address: {} bytes",
                digest.len()
            )));
        }
        let mut arr = [0u8; ADDRESS_SIZE];
        arr.copy_from_slice(&digest[digest.len() - ADDRESS_SIZE..]);
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> CoeoResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)
            .map_err(|e| CoeoError::Serialization(format!("invalid address: {}", e)))?;
        if bytes.len() != ADDRESS_SIZE {
            return Err(CoeoError::Serialization(format!(
                "invalid address length: {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; ADDRESS_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    pub fn zero() -> Self {
        Self([0u8; ADDRESS_SIZE])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_SIZE]
    }

    /// Deterministic test/demo address whose last byte is `n`.
    pub fn from_low_u64(n: u64) -> Self {
        let mut arr = [0u8; ADDRESS_SIZE];
        arr[ADDRESS_SIZE - 8..].copy_from_slice(&n.to_be_bytes());
        Self(arr)
    }
}

impl FromStr for Address {
    type Err = CoeoError;

    fn from_str(s: &str) -> CoeoResult<Self> {
        Self::from_hex(s.trim())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::zero()
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
