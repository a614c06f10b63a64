use crate::voting::is_proposal_topic;
use coeo_crypto::external_nullifier_from_text;
use coeo_types::{
    Address, CoeoError, CoeoResult, ExternalNullifier, Fraction, DEFAULT_TREE_DEPTH,
    MAX_TREE_DEPTH, WAD,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_EPOCH_SECS: u64 = 3600;
pub const DEFAULT_PERIOD_SECS: u64 = 86_500;
pub const DEFAULT_FIRST_TOPIC: &str = "coeo";

/// Per-organization parameters, fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationConfig {
    /// Voting window of a proposal, in seconds.
    pub epoch_secs: u64,
    /// Retention of proposals before they are pruned, in seconds.
    pub period_secs: u64,
    /// Share of enrolled identities that must take part.
    pub quorum: Fraction,
    /// Share of cast votes that must be YES.
    pub approval: Fraction,
    pub tree_depth: usize,
    pub first_external_nullifier: ExternalNullifier,
    pub members: Vec<Address>,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            epoch_secs: DEFAULT_EPOCH_SECS,
            period_secs: DEFAULT_PERIOD_SECS,
            quorum: Fraction::from_wad_saturating(WAD / 4),
            approval: Fraction::from_wad_saturating(WAD / 2 + 1),
            tree_depth: DEFAULT_TREE_DEPTH,
            first_external_nullifier: external_nullifier_from_text(DEFAULT_FIRST_TOPIC),
            members: Vec::new(),
        }
    }
}

impl OrganizationConfig {
    pub fn with_members(members: Vec<Address>) -> Self {
        Self {
            members,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CoeoResult<()> {
        if self.members.is_empty() {
            return Err(CoeoError::Config(
                "organization needs at least one member".into(),
            ));
        }

        let mut seen = HashSet::new();
        for member in &self.members {
            if member.is_zero() {
                return Err(CoeoError::Config("member address cannot be zero".into()));
            }
            if !seen.insert(member) {
                return Err(CoeoError::Config(format!("duplicate member {}", member)));
            }
        }

        if self.epoch_secs == 0 {
            return Err(CoeoError::Config("epoch_secs must be greater than 0".into()));
        }

        if self.period_secs < self.epoch_secs {
            return Err(CoeoError::Config(format!(
                "period_secs ({}) must be at least epoch_secs ({})",
                self.period_secs, self.epoch_secs
            )));
        }

        // Fraction enforces the upper bound on parse; re-check for values built in code.
        if self.quorum.wad() > WAD || self.approval.wad() > WAD {
            return Err(CoeoError::Config("quorum and approval must be in [0, 1]".into()));
        }

        if self.tree_depth == 0 || self.tree_depth > MAX_TREE_DEPTH {
            return Err(CoeoError::Config(format!(
                "tree_depth must be in 1..={}, got {}",
                MAX_TREE_DEPTH, self.tree_depth
            )));
        }

        if !self.first_external_nullifier.is_in_field() {
            return Err(CoeoError::Config(
                "first_external_nullifier must be lt the snark scalar field".into(),
            ));
        }

        if is_proposal_topic(&self.first_external_nullifier) {
            return Err(CoeoError::Config(format!(
                "first_external_nullifier {} falls in the proposal id range",
                self.first_external_nullifier
            )));
        }

        Ok(())
    }
}
