//! Share workflow: establish relationships, create/revoke/consume shares.
//!
//! Owner-side operations require an unlocked vault session. Recipient-side
//! consumption requires only the out-of-band access secret; the recipient
//! has no vault of their own in this protocol.

use crate::error::{ShareError, ShareResult};
use crate::relationship::RelationshipRecord;
use crate::token::{SharePermission, ShareToken};
use crate::ShareStore;
use chrono::{DateTime, Utc};
use papersafe_crypto::{
    decrypt, unwrap_content_key, wrap_content_key, AccessSecret, ContentKey, EncryptedData,
    KdfParams,
};
use papersafe_vault::{
    document_aad, DocumentId, DocumentRecord, OwnerId, TrustedPersonId, VaultSession,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Orchestrates the sharing lifecycle over a [`ShareStore`].
pub struct ShareManager {
    store: Arc<dyn ShareStore>,
    kdf_params: KdfParams,
}

impl ShareManager {
    pub fn new(store: Arc<dyn ShareStore>) -> Self {
        Self {
            store,
            kdf_params: KdfParams::default(),
        }
    }

    /// Overrides the KDF tuning used for access-secret derivation.
    pub fn with_kdf_params(mut self, kdf_params: KdfParams) -> Self {
        self.kdf_params = kdf_params;
        self
    }

    /// Establishes the relationship key for a trusted person.
    ///
    /// Returns the access secret to deliver out-of-band (URL fragment). It is
    /// shown exactly once; re-establishing would orphan existing shares, so
    /// an existing relationship is an error.
    pub async fn establish_relationship(
        &self,
        session: &VaultSession,
        trusted_person: TrustedPersonId,
    ) -> ShareResult<AccessSecret> {
        let master_key = session.master_key()?.clone();
        let owner = session.owner();

        if self
            .store
            .get_relationship(owner, trusted_person)
            .await?
            .is_some()
        {
            return Err(ShareError::RelationshipExists(trusted_person));
        }

        let (record, secret) =
            RelationshipRecord::establish(owner, trusted_person, &master_key, self.kdf_params)?;
        self.store.put_relationship(&record).await?;

        info!(owner = %owner, trusted_person = %trusted_person, "relationship established");
        Ok(secret)
    }

    /// Shares one document with a trusted person: unwraps the DEK under the
    /// master key, re-wraps it under the relationship key, and upserts the
    /// token. Re-sharing replaces the previous token for this pair.
    pub async fn share_document(
        &self,
        session: &VaultSession,
        document: &DocumentRecord,
        trusted_person: TrustedPersonId,
        permission: SharePermission,
        expires_at: Option<DateTime<Utc>>,
    ) -> ShareResult<ShareToken> {
        let master_key = session.master_key()?.clone();
        let owner = session.owner();

        let relationship = self
            .store
            .get_relationship(owner, trusted_person)
            .await?
            .ok_or(ShareError::NoRelationship(trusted_person))?;

        let rk = relationship.owner_key(&master_key)?;
        let dek = unwrap_content_key(&document.wrapped_dek, &master_key)?;

        let token = ShareToken {
            owner,
            document: document.id,
            trusted_person,
            wrapped_dek_for_recipient: wrap_content_key(&dek, &rk)?,
            permission,
            expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        };
        self.store.upsert_token(&token).await?;

        info!(
            owner = %owner,
            document = %document.id,
            trusted_person = %trusted_person,
            "document shared"
        );
        Ok(token)
    }

    /// Revokes a share. Permanent: the token can never become usable again.
    pub async fn revoke_share(
        &self,
        owner: OwnerId,
        document: DocumentId,
        trusted_person: TrustedPersonId,
    ) -> ShareResult<()> {
        let mut token = self
            .store
            .get_token(owner, document, trusted_person)
            .await?
            .ok_or(ShareError::NotFound)?;

        if token.revoked_at.is_none() {
            token.revoked_at = Some(Utc::now());
            self.store.upsert_token(&token).await?;
        }

        info!(owner = %owner, document = %document, trusted_person = %trusted_person, "share revoked");
        Ok(())
    }

    /// Owner-side listing of all tokens for a document.
    pub async fn list_shares(
        &self,
        owner: OwnerId,
        document: DocumentId,
    ) -> ShareResult<Vec<ShareToken>> {
        Ok(self.store.list_tokens(owner, document).await?)
    }

    /// Recipient-side consumption: checks usability at the wall clock, then
    /// unwraps RK and DEK from the access secret.
    ///
    /// Revoked, expired, and nonexistent tokens all yield [`ShareError::NotFound`].
    pub async fn consume_share(
        &self,
        owner: OwnerId,
        document: DocumentId,
        trusted_person: TrustedPersonId,
        secret: &AccessSecret,
    ) -> ShareResult<SharedAccess> {
        self.consume_share_at(owner, document, trusted_person, secret, Utc::now())
            .await
    }

    /// Consumption with an explicit clock (expiry is evaluated at read time).
    pub async fn consume_share_at(
        &self,
        owner: OwnerId,
        document: DocumentId,
        trusted_person: TrustedPersonId,
        secret: &AccessSecret,
        now: DateTime<Utc>,
    ) -> ShareResult<SharedAccess> {
        let token = self
            .store
            .get_token(owner, document, trusted_person)
            .await?
            .filter(|token| token.is_usable_at(now))
            .ok_or(ShareError::NotFound)?;

        let relationship = self
            .store
            .get_relationship(owner, trusted_person)
            .await?
            .ok_or(ShareError::NotFound)?;

        let rk = relationship.recipient_key(secret)?;
        let dek = unwrap_content_key(&token.wrapped_dek_for_recipient, &rk)?;

        debug!(document = %document, trusted_person = %trusted_person, "share consumed");
        Ok(SharedAccess {
            dek,
            document,
            permission: token.permission,
        })
    }
}

/// An opened share: the unwrapped DEK plus the granted permission.
///
/// The DEK never leaves this handle; `View` callers decrypt for rendering and
/// drop the handle, `Download` callers may persist the plaintext.
#[derive(Debug)]
pub struct SharedAccess {
    dek: ContentKey,
    document: DocumentId,
    permission: SharePermission,
}

impl SharedAccess {
    pub fn permission(&self) -> SharePermission {
        self.permission
    }

    pub fn can_download(&self) -> bool {
        self.permission == SharePermission::Download
    }

    /// Decrypts the document's ciphertext. The AAD binding to the document ID
    /// is applied here, so ciphertext from any other document fails.
    pub fn decrypt(&self, content: &EncryptedData) -> ShareResult<Vec<u8>> {
        Ok(decrypt(&self.dek, content, &document_aad(self.document))?)
    }
}
