//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations.
///
/// Decryption and unwrap failures are deliberately generic: a wrong key, a
/// tampered ciphertext, and a mismatched AAD all surface as the same
/// `Decryption` error, so callers cannot be turned into an oracle.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("malformed secret: expected 64 lowercase hex characters")]
    MalformedSecret,
}
