//! Selective, revocable document sharing.
//!
//! Sharing never exposes the owner's master key. Each (owner, trusted person)
//! pair gets a random Relationship Key (RK); sharing a document re-wraps that
//! document's DEK under the RK. The trusted person derives their unwrapping
//! key from a 64-hex access secret delivered out-of-band (a URL fragment the
//! server never sees), so the server holds only wrapped keys end to end.
//!
//! Share tokens carry permission, optional expiry, and a one-way revocation
//! timestamp. Revoked, expired, and nonexistent tokens are indistinguishable
//! at the consumption boundary.

mod error;
pub mod memory;
mod relationship;
mod share;
mod token;

pub use error::{ShareError, ShareResult};
pub use relationship::RelationshipRecord;
pub use share::{ShareManager, SharedAccess};
pub use token::{SharePermission, ShareToken};

use async_trait::async_trait;
use papersafe_vault::{DocumentId, OwnerId, StoreError, TrustedPersonId};

/// Store seam for relationships and share tokens.
///
/// The server-side implementation enforces row scoping: only the owner may
/// write, and only the linked trusted person may read tokens addressed to
/// them. The protocol does not depend on that for confidentiality: every
/// stored key is wrapped.
#[async_trait]
pub trait ShareStore: Send + Sync {
    async fn put_relationship(&self, record: &RelationshipRecord) -> Result<(), StoreError>;

    async fn get_relationship(
        &self,
        owner: OwnerId,
        trusted_person: TrustedPersonId,
    ) -> Result<Option<RelationshipRecord>, StoreError>;

    /// One token per (owner, document, trusted person); replaces any existing
    /// token for that triple.
    async fn upsert_token(&self, token: &ShareToken) -> Result<(), StoreError>;

    async fn get_token(
        &self,
        owner: OwnerId,
        document: DocumentId,
        trusted_person: TrustedPersonId,
    ) -> Result<Option<ShareToken>, StoreError>;

    async fn list_tokens(
        &self,
        owner: OwnerId,
        document: DocumentId,
    ) -> Result<Vec<ShareToken>, StoreError>;
}
