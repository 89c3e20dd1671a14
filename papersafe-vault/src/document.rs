//! Per-document encryption.
//!
//! Each document gets a fresh DEK at upload time. File bytes and sensitive
//! metadata fields are encrypted with the DEK; the DEK travels wrapped under
//! the owner's master key. Title and file type stay plaintext so listings and
//! filters work without decryption.

use crate::error::{StoreError, VaultError, VaultResult};
use crate::ids::{DocumentId, OwnerId};
use crate::session::VaultSession;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use papersafe_crypto::{
    decrypt, decrypt_field, encrypt, encrypt_field, generate_dek, unwrap_content_key,
    wrap_content_key, EncryptedData, WrappedKey,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// AAD binding a ciphertext to its document. Mandatory for every file and
/// field encryption, closing the cross-document substitution gap.
pub fn document_aad(id: DocumentId) -> Vec<u8> {
    id.to_string().into_bytes()
}

/// A metadata field as stored: either legacy plaintext or an opaque
/// DEK-encrypted string. The flag supports plaintext-to-encrypted migration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredField {
    pub value: String,
    pub encrypted: bool,
}

impl StoredField {
    pub fn plaintext(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            encrypted: false,
        }
    }
}

/// An encrypted document as persisted. No plaintext content, no unwrapped
/// key material.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub owner: OwnerId,
    /// Plaintext, for listing and search.
    pub title: String,
    /// MIME type, plaintext.
    pub file_type: String,
    /// The document's DEK, wrapped under the owner's master key.
    pub wrapped_dek: WrappedKey,
    /// File bytes, AES-GCM under the DEK with AAD = document ID.
    pub content: EncryptedData,
    /// Metadata fields, each optionally DEK-encrypted.
    pub fields: BTreeMap<String, StoredField>,
    pub created_at: DateTime<Utc>,
}

/// Plaintext listing entry (no decryption required).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub file_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<&DocumentRecord> for DocumentSummary {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            file_type: record.file_type.clone(),
            created_at: record.created_at,
        }
    }
}

/// A document to be encrypted and stored.
#[derive(Clone, Debug, Default)]
pub struct NewDocument {
    pub title: String,
    pub file_type: String,
    pub content: Vec<u8>,
    /// Stored as-is.
    pub plain_fields: BTreeMap<String, String>,
    /// Encrypted with the document DEK before storage.
    pub sensitive_fields: BTreeMap<String, String>,
}

/// Store seam for encrypted documents. The store sees only ciphertext and
/// plaintext listing metadata.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn put(&self, record: &DocumentRecord) -> Result<(), StoreError>;

    async fn get(&self, owner: OwnerId, id: DocumentId)
        -> Result<Option<DocumentRecord>, StoreError>;

    /// Returns whether a record was deleted.
    async fn delete(&self, owner: OwnerId, id: DocumentId) -> Result<bool, StoreError>;

    async fn list(&self, owner: OwnerId) -> Result<Vec<DocumentSummary>, StoreError>;
}

/// Document encryption workflows over a [`DocumentStore`].
pub struct DocumentVault {
    store: Arc<dyn DocumentStore>,
}

impl DocumentVault {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Encrypts and stores a document. Requires an unlocked session; the
    /// check happens synchronously before the first await, and the master
    /// key is captured at call time, so a concurrent lock cannot strand the
    /// operation halfway.
    pub async fn store_document(
        &self,
        session: &VaultSession,
        new: NewDocument,
    ) -> VaultResult<DocumentId> {
        let master_key = session.master_key()?.clone();

        let id = DocumentId::new();
        let aad = document_aad(id);
        let dek = generate_dek();

        let content = encrypt(&dek, &new.content, &aad)?;
        let wrapped_dek = wrap_content_key(&dek, &master_key)?;

        let mut fields: BTreeMap<String, StoredField> = new
            .plain_fields
            .into_iter()
            .map(|(name, value)| (name, StoredField::plaintext(value)))
            .collect();
        for (name, value) in new.sensitive_fields {
            fields.insert(
                name,
                StoredField {
                    value: encrypt_field(&dek, &value, &aad)?,
                    encrypted: true,
                },
            );
        }

        let record = DocumentRecord {
            id,
            owner: session.owner(),
            title: new.title,
            file_type: new.file_type,
            wrapped_dek,
            content,
            fields,
            created_at: Utc::now(),
        };

        self.store.put(&record).await?;
        debug!(document = %id, "stored encrypted document");
        Ok(id)
    }

    /// Fetches and decrypts a document's file bytes. Integrity failures
    /// surface as errors, never as garbage plaintext.
    pub async fn read_document(
        &self,
        session: &VaultSession,
        id: DocumentId,
    ) -> VaultResult<Vec<u8>> {
        let master_key = session.master_key()?.clone();
        let record = self.record(session.owner(), id).await?;

        let dek = unwrap_content_key(&record.wrapped_dek, &master_key)?;
        Ok(decrypt(&dek, &record.content, &document_aad(id))?)
    }

    /// Decrypts one metadata field; legacy plaintext fields pass through.
    pub async fn read_field(
        &self,
        session: &VaultSession,
        id: DocumentId,
        name: &str,
    ) -> VaultResult<Option<String>> {
        let master_key = session.master_key()?.clone();
        let record = self.record(session.owner(), id).await?;

        let Some(field) = record.fields.get(name) else {
            return Ok(None);
        };
        if !field.encrypted {
            return Ok(Some(field.value.clone()));
        }

        let dek = unwrap_content_key(&record.wrapped_dek, &master_key)?;
        Ok(Some(decrypt_field(&dek, &field.value, &document_aad(id))?))
    }

    /// The stored record (ciphertext + plaintext metadata). Needed by the
    /// sharing layer, which re-wraps the DEK without touching content.
    pub async fn record(&self, owner: OwnerId, id: DocumentId) -> VaultResult<DocumentRecord> {
        self.store
            .get(owner, id)
            .await?
            .ok_or(VaultError::DocumentNotFound(id))
    }

    /// Deletes the record, discarding the DEK wrap with it. No plaintext was
    /// ever persisted, so this is a complete erasure of the document.
    pub async fn delete_document(&self, owner: OwnerId, id: DocumentId) -> VaultResult<()> {
        if self.store.delete(owner, id).await? {
            debug!(document = %id, "deleted document");
            Ok(())
        } else {
            Err(VaultError::DocumentNotFound(id))
        }
    }

    /// Plaintext metadata listing; works while locked.
    pub async fn list_documents(&self, owner: OwnerId) -> VaultResult<Vec<DocumentSummary>> {
        Ok(self.store.list(owner).await?)
    }
}
