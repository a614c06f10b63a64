#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod address;
pub mod constants;
pub mod error;
pub mod field;
pub mod governance;
pub mod proof;

pub use address::Address;
pub use constants::*;
pub use error::{CoeoError, CoeoResult};
pub use field::FieldElement;
pub use governance::{Fraction, ProposalStatus, VoteChoice};
pub use proof::{Proof, PublicInputs};

pub type IdentityCommitment = FieldElement;
pub type MerkleRoot = FieldElement;
pub type ExternalNullifier = FieldElement;
pub type NullifierHash = FieldElement;
pub type SignalHash = FieldElement;
