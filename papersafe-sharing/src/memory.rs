//! In-memory [`ShareStore`] for tests and single-process use.

use crate::relationship::RelationshipRecord;
use crate::token::ShareToken;
use crate::ShareStore;
use async_trait::async_trait;
use papersafe_vault::{DocumentId, OwnerId, StoreError, TrustedPersonId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct MemoryShareStore {
    relationships: Arc<RwLock<HashMap<(OwnerId, TrustedPersonId), RelationshipRecord>>>,
    tokens: Arc<RwLock<HashMap<(OwnerId, DocumentId, TrustedPersonId), ShareToken>>>,
}

impl MemoryShareStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShareStore for MemoryShareStore {
    async fn put_relationship(&self, record: &RelationshipRecord) -> Result<(), StoreError> {
        self.relationships
            .write()
            .await
            .insert((record.owner, record.trusted_person), record.clone());
        Ok(())
    }

    async fn get_relationship(
        &self,
        owner: OwnerId,
        trusted_person: TrustedPersonId,
    ) -> Result<Option<RelationshipRecord>, StoreError> {
        Ok(self
            .relationships
            .read()
            .await
            .get(&(owner, trusted_person))
            .cloned())
    }

    async fn upsert_token(&self, token: &ShareToken) -> Result<(), StoreError> {
        self.tokens
            .write()
            .await
            .insert(
                (token.owner, token.document, token.trusted_person),
                token.clone(),
            );
        Ok(())
    }

    async fn get_token(
        &self,
        owner: OwnerId,
        document: DocumentId,
        trusted_person: TrustedPersonId,
    ) -> Result<Option<ShareToken>, StoreError> {
        Ok(self
            .tokens
            .read()
            .await
            .get(&(owner, document, trusted_person))
            .cloned())
    }

    async fn list_tokens(
        &self,
        owner: OwnerId,
        document: DocumentId,
    ) -> Result<Vec<ShareToken>, StoreError> {
        let tokens = self.tokens.read().await;
        let mut matching: Vec<ShareToken> = tokens
            .values()
            .filter(|token| token.owner == owner && token.document == document)
            .cloned()
            .collect();
        matching.sort_by_key(|token| token.created_at);
        Ok(matching)
    }
}
