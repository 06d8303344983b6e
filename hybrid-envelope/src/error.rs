//! Error types for envelope construction and deconstruction.

use thiserror::Error;

/// Result type for envelope crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while encrypting, wrapping, unwrapping or
/// decrypting an envelope.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("key info too large for wrapping key: {actual} bytes exceeds limit of {max}")]
    WrapSize { max: usize, actual: usize },

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("key unwrap failed: {0}")]
    Unwrap(String),

    #[error("malformed envelope: {0}")]
    EnvelopeFormat(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid IV length: expected {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("private key required to unwrap")]
    MissingPrivateKey,

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("secure random source unavailable: {0}")]
    Random(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("sealed-box primitive unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for CryptoError {
    fn from(e: serde_json::Error) -> Self {
        CryptoError::Serialization(e.to_string())
    }
}
