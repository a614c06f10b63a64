mod logging;
mod organization;
mod verifier;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use organization::{
    OrganizationConfig, DEFAULT_EPOCH_SECS, DEFAULT_FIRST_TOPIC, DEFAULT_PERIOD_SECS,
};
pub use verifier::{KeyFormat, VerifierConfig};

use coeo_types::{Address, CoeoError, CoeoResult, Fraction};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoeoConfig {
    pub organization: OrganizationConfig,
    pub logging: LoggingConfig,
    pub verifier: VerifierConfig,
}

impl CoeoConfig {
    pub fn load(path: impl AsRef<Path>) -> CoeoResult<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| CoeoError::Config(format!("Failed to read config: {}", e)))?;

            toml::from_str(&contents)
                .map_err(|e| CoeoError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> CoeoResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CoeoError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoeoError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path.as_ref(), contents)
            .map_err(|e| CoeoError::Config(format!("Failed to write config: {}", e)))?;

        info!("Configuration saved to {:?}", path.as_ref());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        let org = &mut self.organization;

        if let Ok(epoch) = std::env::var("COEO_EPOCH_SECS") {
            if let Ok(v) = epoch.parse() {
                org.epoch_secs = v;
            }
        }

        if let Ok(period) = std::env::var("COEO_PERIOD_SECS") {
            if let Ok(v) = period.parse() {
                org.period_secs = v;
            }
        }

        if let Ok(quorum) = std::env::var("COEO_QUORUM") {
            match Fraction::from_decimal(&quorum) {
                Ok(v) => org.quorum = v,
                Err(e) => warn!("Ignoring COEO_QUORUM: {}", e),
            }
        }

        if let Ok(approval) = std::env::var("COEO_APPROVAL") {
            match Fraction::from_decimal(&approval) {
                Ok(v) => org.approval = v,
                Err(e) => warn!("Ignoring COEO_APPROVAL: {}", e),
            }
        }

        if let Ok(members) = std::env::var("COEO_MEMBERS") {
            let parsed: Result<Vec<Address>, _> = members
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Address::from_hex)
                .collect();
            match parsed {
                Ok(list) => org.members = list,
                Err(e) => warn!("Ignoring COEO_MEMBERS: {}", e),
            }
        }

        if let Ok(vk) = std::env::var("COEO_VERIFICATION_KEY") {
            self.verifier.verification_key = Some(PathBuf::from(vk));
        }

        if let Ok(level) = std::env::var("COEO_LOG_LEVEL") {
            match level.parse() {
                Ok(level) => self.logging.level = level,
                Err(e) => warn!("Ignoring COEO_LOG_LEVEL: {}", e),
            }
        }

        if let Ok(format) = std::env::var("COEO_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.logging.format = format,
                Err(e) => warn!("Ignoring COEO_LOG_FORMAT: {}", e),
            }
        }
    }

    pub fn validate(&self) -> CoeoResult<()> {
        self.organization.validate()?;
        self.logging.validate()?;

        if self.verifier.verification_key.is_none() {
            warn!("No verification key configured - proofs cannot be verified until one is set");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coeo_types::WAD;

    fn member(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("coeo-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_default_organization_needs_members() {
        let config = CoeoConfig::default();
        assert!(config.validate().is_err());

        let config = CoeoConfig {
            organization: OrganizationConfig::with_members(vec![member(1)]),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_thresholds() {
        let org = OrganizationConfig::default();
        assert_eq!(org.quorum.wad(), WAD / 4);
        assert_eq!(org.approval.wad(), WAD / 2 + 1);
        assert_eq!(org.epoch_secs, 3600);
        assert_eq!(org.tree_depth, 20);
    }

    #[test]
    fn test_period_shorter_than_epoch() {
        let mut org = OrganizationConfig::with_members(vec![member(1)]);
        org.period_secs = org.epoch_secs - 1;
        assert!(org.validate().is_err());
    }

    #[test]
    fn test_zero_epoch() {
        let mut org = OrganizationConfig::with_members(vec![member(1)]);
        org.epoch_secs = 0;
        assert!(org.validate().is_err());
    }

    #[test]
    fn test_invalid_depth() {
        let mut org = OrganizationConfig::with_members(vec![member(1)]);
        org.tree_depth = 0;
        assert!(org.validate().is_err());
        org.tree_depth = 33;
        assert!(org.validate().is_err());
    }

    #[test]
    fn test_first_topic_outside_proposal_ids() {
        let mut org = OrganizationConfig::with_members(vec![member(1)]);
        assert!(org.validate().is_ok());
        org.first_external_nullifier = coeo_types::FieldElement::from(1u64);
        assert!(matches!(org.validate(), Err(CoeoError::Config(_))));
    }

    #[test]
    fn test_duplicate_and_zero_members() {
        let org = OrganizationConfig::with_members(vec![member(1), member(1)]);
        assert!(org.validate().is_err());

        let org = OrganizationConfig::with_members(vec![Address::zero()]);
        assert!(org.validate().is_err());
    }

    #[test]
    fn test_toml_uses_decimal_fractions() {
        let config = CoeoConfig {
            organization: OrganizationConfig::with_members(vec![member(7)]),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize");
        assert!(toml_str.contains("quorum = \"0.25\""));
        assert!(toml_str.contains("0x0000000000000000000000000000000000000007"));

        let parsed: CoeoConfig = toml::from_str(&toml_str).expect("Failed to parse");
        assert_eq!(parsed.organization, config.organization);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: CoeoConfig = toml::from_str(
            r#"
            [organization]
            quorum = "0.5"
            members = ["0x00000000000000000000000000000000000000aa"]

            [logging]
            level = "debug"
            format = "json"
            directives = ["coeo_governance::voting=trace"]
            "#,
        )
        .unwrap();

        assert_eq!(parsed.organization.quorum.wad(), WAD / 2);
        assert_eq!(parsed.organization.epoch_secs, DEFAULT_EPOCH_SECS);
        assert_eq!(parsed.logging.level, LogLevel::Debug);
        assert_eq!(parsed.logging.format, LogFormat::Json);
        assert_eq!(
            parsed.logging.filter(),
            "debug,coeo_governance::voting=trace"
        );
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_fraction_above_one_rejected() {
        let result: Result<CoeoConfig, _> = toml::from_str(
            r#"
            [organization]
            approval = "1.01"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("coeo.toml");
        let config = CoeoConfig {
            organization: OrganizationConfig::with_members(vec![member(3), member(4)]),
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = CoeoConfig::load(&path).unwrap();
        assert_eq!(loaded.organization.members, vec![member(3), member(4)]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_verification_key() {
        let verifier = VerifierConfig::default();
        assert!(matches!(
            verifier.load_verifier(),
            Err(CoeoError::Config(_))
        ));

        let verifier = VerifierConfig {
            verification_key: Some(temp_path("missing.json")),
            format: KeyFormat::SnarkjsJson,
        };
        assert!(verifier.load_verifier().is_err());
    }
}
