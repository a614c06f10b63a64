use crate::constants::{NO_SIGNAL, WAD, WAD_DECIMALS, YES_SIGNAL};
use crate::error::{CoeoError, CoeoResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A ratio in `[0, 1]` stored as an integer scaled by 1e18.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fraction(u128);

impl Fraction {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(WAD);

    pub fn from_wad(raw: u128) -> CoeoResult<Self> {
        if raw > WAD {
            return Err(CoeoError::Config(format!(
                "fraction {} exceeds 1e18",
                raw
            )));
        }
        Ok(Self(raw))
    }

    /// Clamps to 1.
    pub const fn from_wad_saturating(raw: u128) -> Self {
        if raw > WAD {
            Self(WAD)
        } else {
            Self(raw)
        }
    }

    pub fn wad(&self) -> u128 {
        self.0
    }

    pub fn from_decimal(s: &str) -> CoeoResult<Self> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() > 2 {
            return Err(CoeoError::Config(format!("invalid fraction: {:?}", s)));
        }

        let whole: u128 = parts[0]
            .parse()
            .map_err(|_| CoeoError::Config(format!("invalid fraction: {:?}", s)))?;

        let frac = if parts.len() == 2 {
            let frac_str = parts[1];
            if frac_str.len() > WAD_DECIMALS as usize {
                return Err(CoeoError::Config(format!(
                    "fraction has more than {} decimal places: {:?}",
                    WAD_DECIMALS, s
                )));
            }
            let padded = format!("{:0<width$}", frac_str, width = WAD_DECIMALS as usize);
            padded
                .parse::<u128>()
                .map_err(|_| CoeoError::Config(format!("invalid fraction: {:?}", s)))?
        } else {
            0
        };

        let raw = whole
            .checked_mul(WAD)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(|| CoeoError::Config(format!("fraction overflow: {:?}", s)))?;

        Self::from_wad(raw)
    }

    pub fn to_decimal(&self) -> String {
        let whole = self.0 / WAD;
        let frac = self.0 % WAD;

        if frac == 0 {
            whole.to_string()
        } else {
            let frac_str = format!("{:0>width$}", frac, width = WAD_DECIMALS as usize);
            format!("{}.{}", whole, frac_str.trim_end_matches('0'))
        }
    }

    /// `numerator / denominator >= self`, compared without division.
    pub fn is_met(&self, numerator: u64, denominator: u64) -> bool {
        (numerator as u128) * WAD >= self.0 * (denominator as u128)
    }
}

impl FromStr for Fraction {
    type Err = CoeoError;

    fn from_str(s: &str) -> CoeoResult<Self> {
        Self::from_decimal(s)
    }
}

impl fmt::Debug for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fraction({})", self.to_decimal())
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Serialize for Fraction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Fraction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_decimal(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteChoice {
    Yes,
    No,
}

impl VoteChoice {
    pub fn signal(&self) -> &'static [u8] {
        match self {
            VoteChoice::Yes => YES_SIGNAL,
            VoteChoice::No => NO_SIGNAL,
        }
    }

    pub fn from_signal(signal: &[u8]) -> Option<Self> {
        if signal == YES_SIGNAL {
            Some(VoteChoice::Yes)
        } else if signal == NO_SIGNAL {
            Some(VoteChoice::No)
        } else {
            None
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteChoice::Yes => write!(f, "YEA"),
            VoteChoice::No => write!(f, "NAY"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    Pending,
    Executed,
    Expired,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalStatus::Pending => write!(f, "Pending"),
            ProposalStatus::Executed => write!(f, "Executed"),
            ProposalStatus::Expired => write!(f, "Expired"),
        }
    }
}
