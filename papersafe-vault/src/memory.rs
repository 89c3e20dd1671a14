//! In-memory store implementations.
//!
//! Used by tests and by single-process deployments that keep persistence
//! elsewhere. Same tokio-RwLock-over-HashMap shape as any other hot-path
//! registry in the codebase.

use crate::document::{DocumentRecord, DocumentStore, DocumentSummary};
use crate::error::StoreError;
use crate::ids::{DocumentId, OwnerId};
use crate::material::{KeyMaterialStore, MasterKeyRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory [`KeyMaterialStore`].
#[derive(Clone, Default)]
pub struct MemoryKeyMaterialStore {
    records: Arc<RwLock<HashMap<OwnerId, MasterKeyRecord>>>,
}

impl MemoryKeyMaterialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyMaterialStore for MemoryKeyMaterialStore {
    async fn load(&self, owner: OwnerId) -> Result<Option<MasterKeyRecord>, StoreError> {
        Ok(self.records.read().await.get(&owner).cloned())
    }

    async fn save(&self, owner: OwnerId, record: &MasterKeyRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(owner, record.clone());
        Ok(())
    }
}

/// In-memory [`DocumentStore`].
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    records: Arc<RwLock<HashMap<(OwnerId, DocumentId), DocumentRecord>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn put(&self, record: &DocumentRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert((record.owner, record.id), record.clone());
        Ok(())
    }

    async fn get(
        &self,
        owner: OwnerId,
        id: DocumentId,
    ) -> Result<Option<DocumentRecord>, StoreError> {
        Ok(self.records.read().await.get(&(owner, id)).cloned())
    }

    async fn delete(&self, owner: OwnerId, id: DocumentId) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(&(owner, id)).is_some())
    }

    async fn list(&self, owner: OwnerId) -> Result<Vec<DocumentSummary>, StoreError> {
        let records = self.records.read().await;
        let mut summaries: Vec<DocumentSummary> = records
            .values()
            .filter(|r| r.owner == owner)
            .map(DocumentSummary::from)
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}
