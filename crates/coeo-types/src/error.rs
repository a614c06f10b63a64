use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoeoError {
    #[error("Invalid identity commitment: {0}")]
    InvalidCommitment(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No external nullifier exists after the specified one")]
    NoSuccessor,

    #[error("External nullifier is inactive: {0}")]
    Inactive(String),

    #[error("Nullifier already seen")]
    ReplayError,

    #[error("Value must be lt the snark scalar field: {0}")]
    FieldOverflow(String),

    #[error("Invalid field element(s) in proof: {0}")]
    MalformedProof(String),

    #[error("Root not seen")]
    RootNotSeen,

    #[error("Invalid proof")]
    InvalidProof,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Voting period expired for proposal {0}")]
    Expired(u64),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Merkle tree is full ({0} leaves)")]
    TreeFull(u64),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CoeoResult<T> = Result<T, CoeoError>;
