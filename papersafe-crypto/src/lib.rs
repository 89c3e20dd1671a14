//! Encryption primitives for the Papersafe document vault.
//!
//! Implements the client-side key hierarchy:
//!
//! 1. **Master Key (MK)**: random 256-bit key, wrapped (AES-KW) under keys
//!    derived from the owner's passphrase and recovery key. Exists only in
//!    memory while the vault is unlocked.
//! 2. **Data Encryption Key (DEK)**: random key per document, wrapped under
//!    the MK. Encrypts file bytes and sensitive metadata fields (AES-256-GCM).
//! 3. **Relationship Key (RK)**: random key per (owner, trusted person) pair,
//!    used to re-wrap DEKs for sharing.
//!
//! This architecture allows:
//! - Changing the passphrase without re-encrypting any document
//! - Sharing a single document by re-wrapping just its DEK
//! - Recovery access without the server ever seeing a usable key
//!
//! All ciphertexts are bound to their context (document ID) through AES-GCM
//! additional authenticated data, so ciphertext cannot be replayed under a
//! different document's identity.

mod cipher;
mod encoding;
mod error;
mod key;
mod wrap;

pub use cipher::{
    decrypt, decrypt_field, encrypt, encrypt_field, encrypt_with_iv, generate_iv, EncryptedData,
    NONCE_SIZE, TAG_SIZE,
};
pub use encoding::{from_base64, to_base64};
pub use error::{CryptoError, CryptoResult};
pub use key::{
    derive_wrapping_key, generate_dek, generate_master_key, generate_relationship_key,
    AccessSecret, ContentKey, KdfHash, KdfParams, RecoveryKey, Salt, WrappingKey, KEY_SIZE,
    SALT_SIZE, SECRET_HEX_LEN,
};
pub use wrap::{
    unwrap_content_key, unwrap_master_key, wrap_content_key, wrap_master_key, WrappedKey,
};
