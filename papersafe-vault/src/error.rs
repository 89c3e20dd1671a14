//! Vault error types.

use crate::ids::DocumentId;
use papersafe_crypto::CryptoError;
use thiserror::Error;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Failure reported by a store collaborator (opaque to this layer).
#[derive(Debug, Clone, Error)]
#[error("store I/O failure: {0}")]
pub struct StoreError(pub String);

/// Errors that can occur in vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("vault not set up")]
    NotSetUp,

    #[error("vault already set up")]
    AlreadySetUp,

    #[error("vault is locked")]
    Locked,

    /// Wrong passphrase, or key material that does not match it. Deliberately
    /// indistinguishable from one another.
    #[error("invalid passphrase")]
    InvalidPassphrase,

    #[error("invalid recovery key")]
    InvalidRecoveryKey,

    #[error("passphrase too short (min 8 characters)")]
    PassphraseTooShort,

    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
