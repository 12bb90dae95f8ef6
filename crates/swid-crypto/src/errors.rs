//! Cryptographic error types.

use thiserror::Error;

/// Cryptographic operation errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// PEM or PKCS#8 encoding failed
    #[error("Private key encoding failed: {0}")]
    EncodingFailed(String),

    /// PEM or PKCS#8 decoding failed
    #[error("Private key decoding failed: {0}")]
    DecodingFailed(String),

    /// Not a well-formed did:key identifier
    #[error("Invalid did:key identifier: {0}")]
    InvalidDid(String),

    /// Invalid key size
    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize {
        /// Expected key size in bytes
        expected: usize,
        /// Actual key size in bytes
        actual: usize,
    },
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;
