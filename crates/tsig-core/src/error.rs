//! Error types for threshold signing operations

use thiserror::Error;

/// Result type alias for threshold signing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while sharing keys, signing or recovering signatures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Invalid threshold or session configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Fewer distinct, verified shares than the threshold requires
    #[error("Insufficient shares: required {required}, got {actual}")]
    InsufficientShares { required: usize, actual: usize },

    /// A share failed verification against its public commitment or key
    #[error("Invalid share from index {index}")]
    InvalidShare { index: usize },

    /// Two shares were presented with the same index
    #[error("Duplicate share index {index}")]
    DuplicateIndex { index: usize },

    /// Wire decoding of a share failed
    #[error("Malformed share: {0}")]
    MalformedShare(String),

    /// The randomness source failed
    #[error("Randomness failure: {0}")]
    RandomnessFailure(String),

    /// A final signature did not satisfy its verification equation
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// A session operation was called in the wrong phase
    #[error("Invalid session state: expected {expected}, got {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Cryptographic operation failed
    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl From<rand_core::Error> for Error {
    fn from(e: rand_core::Error) -> Self {
        Error::RandomnessFailure(e.to_string())
    }
}
