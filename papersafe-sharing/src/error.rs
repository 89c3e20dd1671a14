//! Sharing error types.

use papersafe_crypto::CryptoError;
use papersafe_vault::{StoreError, TrustedPersonId, VaultError};
use thiserror::Error;

/// Result type for sharing operations.
pub type ShareResult<T> = Result<T, ShareError>;

/// Errors that can occur in sharing operations.
#[derive(Debug, Error)]
pub enum ShareError {
    /// Revoked, expired, and never-existed collapse into this one outcome at
    /// the consumption boundary, so callers cannot probe for token existence.
    #[error("share not found")]
    NotFound,

    /// The access secret was already issued for this pair; it is shown once
    /// and cannot be re-derived.
    #[error("relationship already established with {0}")]
    RelationshipExists(TrustedPersonId),

    #[error("no relationship established with {0}")]
    NoRelationship(TrustedPersonId),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("vault error: {0}")]
    Vault(#[from] VaultError),
}
