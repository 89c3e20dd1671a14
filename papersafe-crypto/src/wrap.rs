//! AES-KW key wrapping (RFC 3394).
//!
//! Wrapping is the only way key material leaves memory: the MK travels
//! wrapped under the PDK/RDK, each DEK under the MK or an RK, and each RK
//! under the MK or a secret-derived key. AES-KW is authenticated and built
//! for key material, so it needs no nonce and a wrong wrapping key is
//! detected as an integrity failure, which is exactly how a wrong
//! passphrase or recovery key is surfaced.

use crate::encoding::{from_base64, to_base64};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{ContentKey, WrappingKey, KEY_SIZE};
use aes_kw::KekAes256;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// A key wrapped under a `WrappingKey`, rendered as an opaque base64 string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrappedKey(String);

impl WrappedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn wrap_bytes(key_bytes: &[u8; KEY_SIZE], kek: &WrappingKey) -> CryptoResult<WrappedKey> {
    let wrapped = KekAes256::from(kek.0)
        .wrap_vec(key_bytes)
        .map_err(|_| CryptoError::Encryption("AES-KW wrap failed".to_string()))?;
    Ok(WrappedKey(to_base64(&wrapped)))
}

fn unwrap_bytes(wrapped: &WrappedKey, kek: &WrappingKey) -> CryptoResult<[u8; KEY_SIZE]> {
    let raw = from_base64(&wrapped.0)?;
    let mut unwrapped = KekAes256::from(kek.0).unwrap_vec(&raw).map_err(|_| {
        CryptoError::Decryption("key unwrap failed (wrong wrapping key or tampered data)".to_string())
    })?;

    if unwrapped.len() != KEY_SIZE {
        let actual = unwrapped.len();
        unwrapped.zeroize();
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual,
        });
    }

    let mut out = [0u8; KEY_SIZE];
    out.copy_from_slice(&unwrapped);
    unwrapped.zeroize();
    Ok(out)
}

/// Wraps a document DEK under the MK or an RK.
pub fn wrap_content_key(dek: &ContentKey, kek: &WrappingKey) -> CryptoResult<WrappedKey> {
    wrap_bytes(&dek.0, kek)
}

/// Unwraps a document DEK. Fails with a generic decryption error if `kek`
/// is not the key it was wrapped under.
pub fn unwrap_content_key(wrapped: &WrappedKey, kek: &WrappingKey) -> CryptoResult<ContentKey> {
    Ok(ContentKey(unwrap_bytes(wrapped, kek)?))
}

/// Wraps a wrapping key under another wrapping key (MK under PDK/RDK, RK
/// under MK or a secret-derived key).
pub fn wrap_master_key(key: &WrappingKey, kek: &WrappingKey) -> CryptoResult<WrappedKey> {
    wrap_bytes(&key.0, kek)
}

/// Inverse of [`wrap_master_key`].
pub fn unwrap_master_key(wrapped: &WrappedKey, kek: &WrappingKey) -> CryptoResult<WrappingKey> {
    Ok(WrappingKey(unwrap_bytes(wrapped, kek)?))
}
