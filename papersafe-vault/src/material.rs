//! Server-held master key material.
//!
//! The record is opaque to the server: both salts are public values, the KDF
//! params are tuning data, and both wrapped forms of the MK are AES-KW
//! ciphertext. Nothing in it is usable without the passphrase or recovery key.

use crate::error::StoreError;
use crate::ids::OwnerId;
use async_trait::async_trait;
use papersafe_crypto::{KdfParams, Salt, WrappedKey};
use serde::{Deserialize, Serialize};

/// One record per owner, created at vault setup and never mutated afterwards.
///
/// Invariant: `wrapped_mk` and `wrapped_mk_with_recovery` unwrap to the same
/// master key; the passphrase path and the recovery path are equivalent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MasterKeyRecord {
    /// Salt for deriving the passphrase-derived key (PDK).
    pub kdf_salt: Salt,
    /// KDF tuning fixed at creation time; replayed verbatim at unlock.
    pub kdf_params: KdfParams,
    /// Master key wrapped under the PDK.
    pub wrapped_mk: WrappedKey,
    /// Independent salt for deriving the recovery-derived key (RDK).
    pub recovery_key_salt: Salt,
    /// The same master key wrapped under the RDK.
    pub wrapped_mk_with_recovery: WrappedKey,
}

/// Store seam for master key material. Upsert semantics, scoped to the
/// authenticated owner.
#[async_trait]
pub trait KeyMaterialStore: Send + Sync {
    async fn load(&self, owner: OwnerId) -> Result<Option<MasterKeyRecord>, StoreError>;

    async fn save(&self, owner: OwnerId, record: &MasterKeyRecord) -> Result<(), StoreError>;
}
