//! Vault session lifecycle and per-document encryption.
//!
//! The vault is a client-side construct: the server stores only wrapped key
//! material and ciphertext, and can never read plaintext. This crate owns the
//! two inner tiers of the hierarchy:
//!
//! - [`VaultSession`]: the locked/unlocked state machine holding the in-memory
//!   master key. The key is structurally unreachable while locked; the state
//!   is an enum, not a boolean beside an `Option`.
//! - [`DocumentVault`]: per-document encryption. Every document gets a fresh
//!   DEK, wrapped under the master key; file bytes and sensitive metadata
//!   fields are AES-GCM-encrypted with the DEK and bound to the document ID
//!   via AAD.
//!
//! Persistence is behind the [`KeyMaterialStore`] and [`DocumentStore`]
//! traits; the server-side implementations are plain row/blob stores with no
//! awareness of the encryption.

mod document;
mod error;
mod ids;
mod material;
pub mod memory;
mod session;

pub use document::{
    document_aad, DocumentRecord, DocumentStore, DocumentSummary, DocumentVault, NewDocument,
    StoredField,
};
pub use error::{StoreError, VaultError, VaultResult};
pub use ids::{DocumentId, OwnerId, TrustedPersonId};
pub use material::{KeyMaterialStore, MasterKeyRecord};
pub use session::VaultSession;
