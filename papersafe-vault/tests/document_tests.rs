//! Per-document encryption tests: upload/read round trips, field
//! encryption with legacy passthrough, AAD binding, and locked-vault gating.

use papersafe_crypto::{KdfHash, KdfParams};
use papersafe_vault::memory::{MemoryDocumentStore, MemoryKeyMaterialStore};
use papersafe_vault::{
    DocumentStore, DocumentVault, NewDocument, OwnerId, StoredField, VaultError, VaultSession,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::sync::Arc;

fn fast_params() -> KdfParams {
    KdfParams {
        iterations: 1_000,
        hash: KdfHash::Sha256,
    }
}

async fn unlocked_session() -> VaultSession {
    let mut session = VaultSession::open(OwnerId::new(), Arc::new(MemoryKeyMaterialStore::new()))
        .await
        .unwrap();
    session
        .set_up_with_params("a sufficiently long passphrase", fast_params())
        .await
        .unwrap();
    session
}

fn doc_store() -> (Arc<MemoryDocumentStore>, DocumentVault) {
    let store = Arc::new(MemoryDocumentStore::new());
    (store.clone(), DocumentVault::new(store))
}

#[tokio::test]
async fn store_and_read_round_trip() {
    let session = unlocked_session().await;
    let (_, vault) = doc_store();

    let id = vault
        .store_document(
            &session,
            NewDocument {
                title: "passport scan".into(),
                file_type: "image/png".into(),
                content: b"\x89PNG fake bytes".to_vec(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        vault.read_document(&session, id).await.unwrap(),
        b"\x89PNG fake bytes"
    );
}

#[tokio::test]
async fn stored_record_contains_no_plaintext_content() {
    let session = unlocked_session().await;
    let (store, vault) = doc_store();

    let id = vault
        .store_document(
            &session,
            NewDocument {
                title: "will".into(),
                file_type: "application/pdf".into(),
                content: b"I leave everything to the cat".to_vec(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let record = store.get(session.owner(), id).await.unwrap().unwrap();
    let stored = record.content.ciphertext;
    let needle = b"everything";
    assert!(
        !stored.windows(needle.len()).any(|w| w == needle),
        "ciphertext must not contain plaintext fragments"
    );
}

#[tokio::test]
async fn locked_vault_rejects_document_operations() {
    let mut session = unlocked_session().await;
    let (_, vault) = doc_store();

    let id = vault
        .store_document(
            &session,
            NewDocument {
                title: "t".into(),
                file_type: "text/plain".into(),
                content: b"x".to_vec(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    session.lock();

    assert!(matches!(
        vault
            .store_document(&session, NewDocument::default())
            .await,
        Err(VaultError::Locked)
    ));
    assert!(matches!(
        vault.read_document(&session, id).await,
        Err(VaultError::Locked)
    ));

    // Plaintext listing still works while locked
    let listed = vault.list_documents(session.owner()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "t");
}

#[tokio::test]
async fn sensitive_fields_are_encrypted_plain_fields_are_not() {
    let session = unlocked_session().await;
    let (store, vault) = doc_store();

    let mut plain = BTreeMap::new();
    plain.insert("category".to_string(), "identity".to_string());
    let mut sensitive = BTreeMap::new();
    sensitive.insert("date_of_birth".to_string(), "1985-02-14".to_string());

    let id = vault
        .store_document(
            &session,
            NewDocument {
                title: "id card".into(),
                file_type: "image/jpeg".into(),
                content: b"jpeg".to_vec(),
                plain_fields: plain,
                sensitive_fields: sensitive,
            },
        )
        .await
        .unwrap();

    let record = store.get(session.owner(), id).await.unwrap().unwrap();
    let dob = record.fields.get("date_of_birth").unwrap();
    assert!(dob.encrypted);
    assert!(!dob.value.contains("1985"), "stored field must be opaque");
    assert_eq!(
        record.fields.get("category").unwrap(),
        &StoredField::plaintext("identity")
    );

    // Decryption restores the original, and the plain field passes through
    assert_eq!(
        vault
            .read_field(&session, id, "date_of_birth")
            .await
            .unwrap()
            .as_deref(),
        Some("1985-02-14")
    );
    assert_eq!(
        vault
            .read_field(&session, id, "category")
            .await
            .unwrap()
            .as_deref(),
        Some("identity")
    );
    assert_eq!(vault.read_field(&session, id, "missing").await.unwrap(), None);
}

#[tokio::test]
async fn tampered_content_fails_to_decrypt() {
    let session = unlocked_session().await;
    let (store, vault) = doc_store();

    let id = vault
        .store_document(
            &session,
            NewDocument {
                title: "tax return".into(),
                file_type: "application/pdf".into(),
                content: b"2025 tax return".to_vec(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut record = store.get(session.owner(), id).await.unwrap().unwrap();
    record.content.ciphertext[0] ^= 0xFF;
    store.put(&record).await.unwrap();

    assert!(matches!(
        vault.read_document(&session, id).await,
        Err(VaultError::Crypto(_))
    ));
}

#[tokio::test]
async fn ciphertext_cannot_be_replayed_under_another_document() {
    let session = unlocked_session().await;
    let (store, vault) = doc_store();

    let doc = |title: &str, content: &[u8]| NewDocument {
        title: title.into(),
        file_type: "text/plain".into(),
        content: content.to_vec(),
        ..Default::default()
    };
    let id_a = vault
        .store_document(&session, doc("a", b"contents of A"))
        .await
        .unwrap();
    let id_b = vault
        .store_document(&session, doc("b", b"contents of B"))
        .await
        .unwrap();

    // Graft A's wrapped DEK and ciphertext onto B's identity
    let record_a = store.get(session.owner(), id_a).await.unwrap().unwrap();
    let mut record_b = store.get(session.owner(), id_b).await.unwrap().unwrap();
    record_b.wrapped_dek = record_a.wrapped_dek.clone();
    record_b.content = record_a.content.clone();
    store.put(&record_b).await.unwrap();

    // AAD binding makes the substitution detectable
    assert!(vault.read_document(&session, id_b).await.is_err());
    assert_eq!(
        vault.read_document(&session, id_a).await.unwrap(),
        b"contents of A"
    );
}

#[tokio::test]
async fn delete_discards_record_and_wrap() {
    let session = unlocked_session().await;
    let (store, vault) = doc_store();

    let id = vault
        .store_document(
            &session,
            NewDocument {
                title: "temp".into(),
                file_type: "text/plain".into(),
                content: b"ephemeral".to_vec(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    vault.delete_document(session.owner(), id).await.unwrap();
    assert!(store.get(session.owner(), id).await.unwrap().is_none());
    assert!(matches!(
        vault.delete_document(session.owner(), id).await,
        Err(VaultError::DocumentNotFound(_))
    ));
    assert!(matches!(
        vault.read_document(&session, id).await,
        Err(VaultError::DocumentNotFound(_))
    ));
}

#[tokio::test]
async fn documents_are_scoped_to_their_owner() {
    let session_a = unlocked_session().await;
    let session_b = unlocked_session().await;
    let (_, vault) = doc_store();

    let id = vault
        .store_document(
            &session_a,
            NewDocument {
                title: "private".into(),
                file_type: "text/plain".into(),
                content: b"owner A only".to_vec(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        vault.read_document(&session_b, id).await,
        Err(VaultError::DocumentNotFound(_))
    ));
    assert!(vault.list_documents(session_b.owner()).await.unwrap().is_empty());
}
