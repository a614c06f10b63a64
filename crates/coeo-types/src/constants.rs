pub const FIELD_ELEMENT_SIZE: usize = 32;

pub const ADDRESS_SIZE: usize = 20;

/// Groth16 proof flattened to field elements: A (2), B (4), C (2).
pub const PROOF_ELEMENT_COUNT: usize = 8;

pub const DEFAULT_TREE_DEPTH: usize = 20;

pub const MAX_TREE_DEPTH: usize = 32;

/// Fixed-point scale for quorum and approval fractions.
pub const WAD: u128 = 1_000_000_000_000_000_000;

pub const WAD_DECIMALS: u8 = 18;

pub const SNARK_SCALAR_FIELD: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// `SNARK_SCALAR_FIELD` as big-endian bytes.
pub const SNARK_SCALAR_FIELD_BYTES: [u8; FIELD_ELEMENT_SIZE] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91, 0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x01,
];

pub const YES_SIGNAL: &[u8] = b"YEA";

pub const NO_SIGNAL: &[u8] = b"NAY";

pub const SENTINEL_SEED: &[u8] = b"Semaphore";
