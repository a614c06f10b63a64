use coeo_crypto::{Groth16Verifier, ProofVerifier};
use coeo_types::{CoeoError, CoeoResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyFormat {
    /// snarkjs `verification_key.json`
    #[default]
    SnarkjsJson,
    /// arkworks `VerifyingKey::serialize_compressed`
    ArkCompressed,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub verification_key: Option<PathBuf>,
    pub format: KeyFormat,
}

impl VerifierConfig {
    pub fn load_verifier(&self) -> CoeoResult<Box<dyn ProofVerifier>> {
        let path = self
            .verification_key
            .as_ref()
            .ok_or_else(|| CoeoError::Config("no verification key configured".into()))?;

        let verifier = match self.format {
            KeyFormat::SnarkjsJson => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    CoeoError::Config(format!("Failed to read verification key: {}", e))
                })?;
                Groth16Verifier::from_snarkjs_json(&json)?
            }
            KeyFormat::ArkCompressed => {
                let bytes = std::fs::read(path).map_err(|e| {
                    CoeoError::Config(format!("Failed to read verification key: {}", e))
                })?;
                Groth16Verifier::from_compressed(&bytes)?
            }
        };

        info!("Loaded verification key from {:?}", path);
        Ok(Box::new(verifier))
    }
}
