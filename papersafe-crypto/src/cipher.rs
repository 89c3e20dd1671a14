//! AES-256-GCM authenticated encryption for document bytes and metadata
//! fields.
//!
//! Every call binds the ciphertext to a caller-supplied AAD (the document ID
//! in practice), so a ciphertext lifted from one document can never be
//! presented under another document's identity. A fresh random 96-bit IV is
//! generated per encryption; IV reuse under the same key breaks GCM, so there
//! is no counter or caching, just `OsRng` every time.

use crate::encoding::{from_base64, to_base64};
use crate::error::{CryptoError, CryptoResult};
use crate::key::ContentKey;
use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Size of the AES-GCM IV in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// An AES-GCM ciphertext with the IV it was produced under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    /// 96-bit IV, unique per (key, plaintext) pair.
    pub iv: [u8; NONCE_SIZE],
    /// Ciphertext with the 16-byte GCM tag appended.
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Total stored size: IV plus ciphertext-with-tag.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Renders as a single opaque base64 string: `IV || ciphertext`.
    pub fn to_base64(&self) -> String {
        let mut buf = Vec::with_capacity(self.len());
        buf.extend_from_slice(&self.iv);
        buf.extend_from_slice(&self.ciphertext);
        to_base64(&buf)
    }

    /// Parses the `IV || ciphertext` base64 form.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let raw = from_base64(encoded)
            .map_err(|_| CryptoError::Decryption("invalid base64 ciphertext".to_string()))?;
        if raw.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption(
                "ciphertext too short to contain IV and tag".to_string(),
            ));
        }
        let mut iv = [0u8; NONCE_SIZE];
        iv.copy_from_slice(&raw[..NONCE_SIZE]);
        Ok(Self {
            iv,
            ciphertext: raw[NONCE_SIZE..].to_vec(),
        })
    }
}

/// Generates a fresh random 96-bit IV.
pub fn generate_iv() -> [u8; NONCE_SIZE] {
    let mut iv = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypts `plaintext` with a fresh random IV, binding `aad` into the tag.
pub fn encrypt(key: &ContentKey, plaintext: &[u8], aad: &[u8]) -> CryptoResult<EncryptedData> {
    encrypt_with_iv(key, plaintext, generate_iv(), aad)
}

/// Encrypts with a caller-supplied IV.
///
/// The IV must be unique per (key, plaintext) pair; prefer [`encrypt`].
pub fn encrypt_with_iv(
    key: &ContentKey,
    plaintext: &[u8],
    iv: [u8; NONCE_SIZE],
    aad: &[u8],
) -> CryptoResult<EncryptedData> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| CryptoError::Encryption("AES-GCM encryption failed".to_string()))?;

    Ok(EncryptedData { iv, ciphertext })
}

/// Decrypts and authenticates. Fails on any tampering of ciphertext, IV, or
/// AAD, and on key mismatch. Never returns partial plaintext.
pub fn decrypt(key: &ContentKey, data: &EncryptedData, aad: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
    cipher
        .decrypt(
            Nonce::from_slice(&data.iv),
            Payload {
                msg: &data.ciphertext,
                aad,
            },
        )
        .map_err(|_| {
            CryptoError::Decryption(
                "wrong key, tampered ciphertext, or AAD mismatch".to_string(),
            )
        })
}

/// Encrypts a short string field into a single self-describing base64 string
/// (the IV is embedded in the output).
pub fn encrypt_field(key: &ContentKey, value: &str, aad: &[u8]) -> CryptoResult<String> {
    Ok(encrypt(key, value.as_bytes(), aad)?.to_base64())
}

/// Decrypts a field produced by [`encrypt_field`].
pub fn decrypt_field(key: &ContentKey, encoded: &str, aad: &[u8]) -> CryptoResult<String> {
    let data = EncryptedData::from_base64(encoded)?;
    let plaintext = decrypt(key, &data, aad)?;
    String::from_utf8(plaintext)
        .map_err(|_| CryptoError::Decryption("decrypted field is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::generate_dek;

    #[test]
    fn hello_world_round_trip() {
        let dek = generate_dek();
        let encrypted = encrypt(&dek, b"hello world", b"doc-1").unwrap();
        let decrypted = decrypt(&dek, &encrypted, b"doc-1").unwrap();
        assert_eq!(decrypted, b"hello world");
    }

    #[test]
    fn fresh_iv_per_call() {
        let dek = generate_dek();
        let a = encrypt(&dek, b"same plaintext", b"ctx").unwrap();
        let b = encrypt(&dek, b"same plaintext", b"ctx").unwrap();
        assert_ne!(a.iv, b.iv, "IVs must differ");
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn aad_mismatch_rejected() {
        let dek = generate_dek();
        let encrypted = encrypt(&dek, b"bound to doc-1", b"doc-1").unwrap();
        assert!(decrypt(&dek, &encrypted, b"doc-2").is_err());
        assert_eq!(decrypt(&dek, &encrypted, b"doc-1").unwrap(), b"bound to doc-1");
    }

    #[test]
    fn iv_tamper_rejected() {
        let dek = generate_dek();
        let mut encrypted = encrypt(&dek, b"iv matters", b"").unwrap();
        encrypted.iv[0] ^= 0x01;
        assert!(decrypt(&dek, &encrypted, b"").is_err());
    }

    #[test]
    fn field_round_trip_and_self_description() {
        let dek = generate_dek();
        let sealed = encrypt_field(&dek, "+41 79 555 01 23", b"doc-7").unwrap();
        // Opaque single string, decodable without a separate IV
        assert_eq!(decrypt_field(&dek, &sealed, b"doc-7").unwrap(), "+41 79 555 01 23");
        assert!(decrypt_field(&dek, &sealed, b"doc-8").is_err());
    }

    #[test]
    fn explicit_iv_is_honored() {
        let dek = generate_dek();
        let iv = generate_iv();
        let encrypted = encrypt_with_iv(&dek, b"pinned iv", iv, b"").unwrap();
        assert_eq!(encrypted.iv, iv);
        assert_eq!(decrypt(&dek, &encrypted, b"").unwrap(), b"pinned iv");
    }

    #[test]
    fn base64_form_too_short_rejected() {
        let short = to_base64(&[0u8; 10]);
        assert!(matches!(
            EncryptedData::from_base64(&short),
            Err(CryptoError::Decryption(_))
        ));
    }
}
