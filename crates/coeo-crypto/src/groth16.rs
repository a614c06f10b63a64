//! Groth16 verification over BN254 for the membership circuit.
//!
//! Keys load from a snarkjs `verification_key.json` or from arkworks
//! compressed bytes. Proofs cross the wire as eight base-field coordinates in
//! Solidity verifier order, with `(0, 0)` standing for the point at infinity.

use crate::field::{from_fq, to_fq, to_fr};
use crate::verifier::ProofVerifier;
use ark_bn254::{Bn254, Fq2, Fr, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof as ArkProof, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use coeo_types::{CoeoError, CoeoResult, FieldElement, Proof, PublicInputs};
use serde::Deserialize;
use tracing::debug;

/// Root, nullifier hash, signal hash, external nullifier.
pub const PUBLIC_INPUT_COUNT: usize = 4;

pub struct Groth16Verifier {
    pvk: PreparedVerifyingKey<Bn254>,
}

impl Groth16Verifier {
    pub fn new(vk: &VerifyingKey<Bn254>) -> CoeoResult<Self> {
        if vk.gamma_abc_g1.len() != PUBLIC_INPUT_COUNT + 1 {
            return Err(CoeoError::Crypto(format!(
                "verifying key expects {} public inputs, circuit has {}",
                vk.gamma_abc_g1.len().saturating_sub(1),
                PUBLIC_INPUT_COUNT
            )));
        }
        let pvk = Groth16::<Bn254>::process_vk(vk)
            .map_err(|e| CoeoError::Crypto(format!("failed to process verifying key: {}", e)))?;
        Ok(Self { pvk })
    }

    pub fn from_compressed(bytes: &[u8]) -> CoeoResult<Self> {
        let vk = VerifyingKey::<Bn254>::deserialize_compressed(bytes)
            .map_err(|e| CoeoError::Crypto(format!("invalid verifying key bytes: {}", e)))?;
        Self::new(&vk)
    }

    pub fn to_compressed(&self) -> CoeoResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.pvk
            .vk
            .serialize_compressed(&mut bytes)
            .map_err(|e| CoeoError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    pub fn from_snarkjs_json(json: &str) -> CoeoResult<Self> {
        let raw: SnarkjsVerificationKey = serde_json::from_str(json)
            .map_err(|e| CoeoError::Crypto(format!("invalid verification_key.json: {}", e)))?;

        if raw.protocol != "groth16" || raw.curve != "bn128" {
            return Err(CoeoError::Crypto(format!(
                "unsupported key: protocol {} on {}",
                raw.protocol, raw.curve
            )));
        }
        if raw.n_public != PUBLIC_INPUT_COUNT {
            return Err(CoeoError::Crypto(format!(
                "nPublic is {}, expected {}",
                raw.n_public, PUBLIC_INPUT_COUNT
            )));
        }

        let vk = VerifyingKey::<Bn254> {
            alpha_g1: parse_g1(&raw.vk_alpha_1)?,
            beta_g2: parse_g2(&raw.vk_beta_2)?,
            gamma_g2: parse_g2(&raw.vk_gamma_2)?,
            delta_g2: parse_g2(&raw.vk_delta_2)?,
            gamma_abc_g1: raw
                .ic
                .iter()
                .map(|p| parse_g1(p))
                .collect::<CoeoResult<Vec<_>>>()?,
        };
        Self::new(&vk)
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.pvk.vk
    }
}

impl ProofVerifier for Groth16Verifier {
    fn verify(&self, inputs: &PublicInputs, proof: &Proof) -> CoeoResult<bool> {
        let proof = decode_proof(proof)?;
        let public_inputs = inputs
            .to_array()
            .iter()
            .map(to_fr)
            .collect::<CoeoResult<Vec<Fr>>>()?;

        let valid = Groth16::<Bn254>::verify_with_processed_vk(&self.pvk, &public_inputs, &proof)
            .map_err(|e| CoeoError::Crypto(format!("verification failed: {}", e)))?;
        debug!(valid, "groth16 verification");
        Ok(valid)
    }
}

pub fn encode_proof(proof: &ArkProof<Bn254>) -> Proof {
    let (ax, ay) = encode_g1(&proof.a);
    let (cx, cy) = encode_g1(&proof.c);
    let (bx, by) = if proof.b.infinity {
        (Fq2::default(), Fq2::default())
    } else {
        (proof.b.x, proof.b.y)
    };
    Proof::new([
        ax,
        ay,
        from_fq(&bx.c1),
        from_fq(&bx.c0),
        from_fq(&by.c1),
        from_fq(&by.c0),
        cx,
        cy,
    ])
}

pub fn decode_proof(proof: &Proof) -> CoeoResult<ArkProof<Bn254>> {
    let e = proof.elements();
    let a = decode_g1(&e[0], &e[1])?;
    let bx = Fq2::new(to_fq(&e[3])?, to_fq(&e[2])?);
    let by = Fq2::new(to_fq(&e[5])?, to_fq(&e[4])?);
    let b = checked_g2(bx, by).map_err(CoeoError::MalformedProof)?;
    let c = decode_g1(&e[6], &e[7])?;
    Ok(ArkProof { a, b, c })
}

fn encode_g1(point: &G1Affine) -> (FieldElement, FieldElement) {
    if point.infinity {
        (FieldElement::ZERO, FieldElement::ZERO)
    } else {
        (from_fq(&point.x), from_fq(&point.y))
    }
}

fn decode_g1(x: &FieldElement, y: &FieldElement) -> CoeoResult<G1Affine> {
    checked_g1(to_fq(x)?, to_fq(y)?).map_err(CoeoError::MalformedProof)
}

fn checked_g1(x: ark_bn254::Fq, y: ark_bn254::Fq) -> Result<G1Affine, String> {
    if x == ark_bn254::Fq::from(0u64) && y == ark_bn254::Fq::from(0u64) {
        return Ok(G1Affine::zero());
    }
    let point = G1Affine::new_unchecked(x, y);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err("G1 point not on curve".to_string());
    }
    Ok(point)
}

fn checked_g2(x: Fq2, y: Fq2) -> Result<G2Affine, String> {
    if x == Fq2::default() && y == Fq2::default() {
        return Ok(G2Affine::zero());
    }
    let point = G2Affine::new_unchecked(x, y);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err("G2 point not on curve or not in subgroup".to_string());
    }
    Ok(point)
}

#[derive(Deserialize)]
struct SnarkjsVerificationKey {
    protocol: String,
    curve: String,
    #[serde(rename = "nPublic")]
    n_public: usize,
    vk_alpha_1: Vec<String>,
    vk_beta_2: Vec<Vec<String>>,
    vk_gamma_2: Vec<Vec<String>>,
    vk_delta_2: Vec<Vec<String>>,
    #[serde(rename = "IC")]
    ic: Vec<Vec<String>>,
}

fn parse_coord(s: &str) -> CoeoResult<ark_bn254::Fq> {
    let fe: FieldElement = s.parse()?;
    to_fq(&fe).map_err(|_| CoeoError::Crypto(format!("coordinate out of range: {}", s)))
}

fn parse_g1(coords: &[String]) -> CoeoResult<G1Affine> {
    if coords.len() != 3 {
        return Err(CoeoError::Crypto("G1 point needs 3 coordinates".into()));
    }
    if coords[2] == "0" {
        return Ok(G1Affine::zero());
    }
    checked_g1(parse_coord(&coords[0])?, parse_coord(&coords[1])?).map_err(CoeoError::Crypto)
}

fn parse_g2(coords: &[Vec<String>]) -> CoeoResult<G2Affine> {
    if coords.len() != 3 || coords.iter().any(|c| c.len() != 2) {
        return Err(CoeoError::Crypto("G2 point needs 3 pairs of coordinates".into()));
    }
    if coords[2][0] == "0" && coords[2][1] == "0" {
        return Ok(G2Affine::zero());
    }
    let x = Fq2::new(parse_coord(&coords[0][0])?, parse_coord(&coords[0][1])?);
    let y = Fq2::new(parse_coord(&coords[1][0])?, parse_coord(&coords[1][1])?);
    checked_g2(x, y).map_err(CoeoError::Crypto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::from_fr;
    use ark_relations::lc;
    use ark_relations::r1cs::{
        ConstraintSynthesizer, ConstraintSystemRef, SynthesisError, Variable,
    };
    use ark_groth16::ProvingKey;
    use ark_snark::CircuitSpecificSetupSNARK;

    /// Stand-in for the membership circuit with the same public interface:
    /// `secret^2 == root`, `secret * en == nullifier_hash`.
    #[derive(Clone)]
    struct ToyCircuit {
        secret: Fr,
        root: Fr,
        nullifier_hash: Fr,
        signal_hash: Fr,
        external_nullifier: Fr,
    }

    impl ConstraintSynthesizer<Fr> for ToyCircuit {
        fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
            let root = cs.new_input_variable(|| Ok(self.root))?;
            let nullifier_hash = cs.new_input_variable(|| Ok(self.nullifier_hash))?;
            let signal_hash = cs.new_input_variable(|| Ok(self.signal_hash))?;
            let external_nullifier = cs.new_input_variable(|| Ok(self.external_nullifier))?;
            let secret = cs.new_witness_variable(|| Ok(self.secret))?;

            cs.enforce_constraint(lc!() + secret, lc!() + secret, lc!() + root)?;
            cs.enforce_constraint(
                lc!() + secret,
                lc!() + external_nullifier,
                lc!() + nullifier_hash,
            )?;
            cs.enforce_constraint(lc!() + signal_hash, lc!() + Variable::One, lc!() + signal_hash)?;
            Ok(())
        }
    }

    fn toy(secret: u64, signal: u64, en: u64) -> ToyCircuit {
        let secret = Fr::from(secret);
        let en = Fr::from(en);
        ToyCircuit {
            secret,
            root: secret * secret,
            nullifier_hash: secret * en,
            signal_hash: Fr::from(signal),
            external_nullifier: en,
        }
    }

    fn setup() -> (ProvingKey<Bn254>, VerifyingKey<Bn254>) {
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(0);
        Groth16::<Bn254>::circuit_specific_setup(toy(1, 1, 1), &mut rng).unwrap()
    }

    fn inputs_of(c: &ToyCircuit) -> PublicInputs {
        PublicInputs::new(
            from_fr(&c.root),
            from_fr(&c.nullifier_hash),
            from_fr(&c.signal_hash),
            from_fr(&c.external_nullifier),
        )
    }

    fn g1_json(p: &G1Affine) -> serde_json::Value {
        serde_json::json!([from_fq(&p.x).to_string(), from_fq(&p.y).to_string(), "1"])
    }

    fn g2_json(p: &G2Affine) -> serde_json::Value {
        serde_json::json!([
            [from_fq(&p.x.c0).to_string(), from_fq(&p.x.c1).to_string()],
            [from_fq(&p.y.c0).to_string(), from_fq(&p.y.c1).to_string()],
            ["1", "0"]
        ])
    }

    fn snarkjs_json(vk: &VerifyingKey<Bn254>, n_public: usize) -> String {
        serde_json::json!({
            "protocol": "groth16",
            "curve": "bn128",
            "nPublic": n_public,
            "vk_alpha_1": g1_json(&vk.alpha_g1),
            "vk_beta_2": g2_json(&vk.beta_g2),
            "vk_gamma_2": g2_json(&vk.gamma_g2),
            "vk_delta_2": g2_json(&vk.delta_g2),
            "IC": vk.gamma_abc_g1.iter().map(g1_json).collect::<Vec<_>>(),
        })
        .to_string()
    }

    #[test]
    fn test_valid_proof_verifies() {
        let (pk, vk) = setup();
        let verifier = Groth16Verifier::new(&vk).unwrap();
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(0);

        let circuit = toy(3, 7, 5);
        let inputs = inputs_of(&circuit);
        let ark_proof = Groth16::<Bn254>::prove(&pk, circuit, &mut rng).unwrap();
        let proof = encode_proof(&ark_proof);

        assert!(verifier.verify(&inputs, &proof).unwrap());
    }

    #[test]
    fn test_wrong_public_input_rejected() {
        let (pk, vk) = setup();
        let verifier = Groth16Verifier::new(&vk).unwrap();
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(0);

        let circuit = toy(3, 7, 5);
        let mut inputs = inputs_of(&circuit);
        let proof = encode_proof(&Groth16::<Bn254>::prove(&pk, circuit, &mut rng).unwrap());

        inputs.signal_hash = FieldElement::from(8u64);
        assert!(!verifier.verify(&inputs, &proof).unwrap());
    }

    #[test]
    fn test_wire_encoding_roundtrip() {
        let (pk, _) = setup();
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(0);
        let ark_proof = Groth16::<Bn254>::prove(&pk, toy(2, 1, 9), &mut rng).unwrap();

        let wire = encode_proof(&ark_proof);
        assert_eq!(decode_proof(&wire).unwrap(), ark_proof);
    }

    #[test]
    fn test_off_curve_point_is_malformed() {
        let mut elements = [FieldElement::ZERO; 8];
        elements[0] = FieldElement::from(1u64);
        elements[1] = FieldElement::from(1u64);
        assert!(matches!(
            decode_proof(&Proof::new(elements)),
            Err(CoeoError::MalformedProof(_))
        ));
    }

    #[test]
    fn test_snarkjs_key_loading() {
        let (pk, vk) = setup();
        let verifier = Groth16Verifier::from_snarkjs_json(&snarkjs_json(&vk, 4)).unwrap();
        assert_eq!(verifier.verifying_key(), &vk);

        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(0);
        let circuit = toy(4, 11, 6);
        let inputs = inputs_of(&circuit);
        let proof = encode_proof(&Groth16::<Bn254>::prove(&pk, circuit, &mut rng).unwrap());
        assert!(verifier.verify(&inputs, &proof).unwrap());

        assert!(Groth16Verifier::from_snarkjs_json(&snarkjs_json(&vk, 3)).is_err());
        assert!(Groth16Verifier::from_snarkjs_json("{}").is_err());
    }

    #[test]
    fn test_compressed_key_roundtrip() {
        let (_, vk) = setup();
        let verifier = Groth16Verifier::new(&vk).unwrap();
        let bytes = verifier.to_compressed().unwrap();
        let restored = Groth16Verifier::from_compressed(&bytes).unwrap();
        assert_eq!(restored.verifying_key(), &vk);
    }
}
