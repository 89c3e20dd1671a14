//! Key material: opaque key types, PBKDF2 derivation, random generation.
//!
//! Key bytes are never exposed outside this crate. `WrappingKey` can only be
//! used through the AES-KW functions in `wrap`, and `ContentKey` only through
//! the AES-GCM functions in `cipher`, so a passphrase-derived key cannot be
//! misused for bulk encryption, and a DEK cannot wrap other keys.

use crate::error::{CryptoError, CryptoResult};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of every symmetric key in the hierarchy (256 bits).
pub const KEY_SIZE: usize = 32;

/// Size of a KDF salt (256 bits).
pub const SALT_SIZE: usize = 32;

/// Length of a recovery key or access secret rendered as lowercase hex.
pub const SECRET_HEX_LEN: usize = 64;

/// PBKDF2 iteration count used when no explicit params are given.
const DEFAULT_ITERATIONS: u32 = 600_000;

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Random salt for PBKDF2 derivation. Stored alongside the wrapped key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    pub fn random() -> Self {
        Self(random_bytes())
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// PBKDF2 hash function choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfHash {
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "SHA-512")]
    Sha512,
}

/// PBKDF2 tuning parameters.
///
/// Stored with every record that used them: PBKDF2 is deterministic only
/// given identical params, so unlock must replay the params from setup time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub iterations: u32,
    pub hash: KdfHash,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            hash: KdfHash::Sha256,
        }
    }
}

/// A 256-bit key used exclusively to wrap and unwrap other keys (AES-KW).
///
/// Covers the MK, PDK, RDK, and RK roles of the hierarchy. There is no byte
/// accessor: the only operations are `wrap::wrap_*` / `wrap::unwrap_*`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WrappingKey(pub(crate) [u8; KEY_SIZE]);

impl fmt::Debug for WrappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WrappingKey(REDACTED)")
    }
}

/// A 256-bit key used exclusively for AES-GCM content encryption (the DEK).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ContentKey(pub(crate) [u8; KEY_SIZE]);

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentKey(REDACTED)")
    }
}

/// Generates a fresh random DEK for one document.
pub fn generate_dek() -> ContentKey {
    ContentKey(random_bytes())
}

/// Generates a fresh random master key.
pub fn generate_master_key() -> WrappingKey {
    WrappingKey(random_bytes())
}

/// Generates a fresh random relationship key for one (owner, trusted person)
/// pair. Reused across every document shared with that person.
pub fn generate_relationship_key() -> WrappingKey {
    WrappingKey(random_bytes())
}

/// Derives a wrapping key from a secret string via PBKDF2-HMAC.
///
/// Produces the PDK (from the passphrase), the RDK (from the recovery key),
/// and the recipient-side relationship unwrapping key (from the out-of-band
/// access secret). The output can only wrap/unwrap, never bulk-encrypt.
pub fn derive_wrapping_key(
    secret: &str,
    salt: &Salt,
    params: &KdfParams,
) -> CryptoResult<WrappingKey> {
    if params.iterations == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be nonzero".to_string(),
        ));
    }

    let mut out = [0u8; KEY_SIZE];
    match params.hash {
        KdfHash::Sha256 => pbkdf2::pbkdf2_hmac::<Sha256>(
            secret.as_bytes(),
            salt.as_bytes(),
            params.iterations,
            &mut out,
        ),
        KdfHash::Sha512 => pbkdf2::pbkdf2_hmac::<Sha512>(
            secret.as_bytes(),
            salt.as_bytes(),
            params.iterations,
            &mut out,
        ),
    }

    Ok(WrappingKey(out))
}

/// 256 bits of entropy rendered as 64 lowercase hex characters.
fn generate_hex_secret() -> String {
    hex::encode(random_bytes::<KEY_SIZE>())
}

fn validate_hex_secret(value: &str) -> CryptoResult<()> {
    if value.len() == SECRET_HEX_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        Ok(())
    } else {
        Err(CryptoError::MalformedSecret)
    }
}

/// Owner recovery key: shown once at vault setup, never stored anywhere.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RecoveryKey(String);

impl RecoveryKey {
    pub fn generate() -> Self {
        Self(generate_hex_secret())
    }

    /// Parses user input, enforcing the 64-lowercase-hex format.
    pub fn parse(value: &str) -> CryptoResult<Self> {
        validate_hex_secret(value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecoveryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecoveryKey(REDACTED)")
    }
}

/// Out-of-band secret that lets a trusted person derive their relationship
/// unwrapping key. Delivered through a channel the server cannot observe
/// (a URL fragment; fragments are never sent over HTTP).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessSecret(String);

impl AccessSecret {
    pub fn generate() -> Self {
        Self(generate_hex_secret())
    }

    pub fn parse(value: &str) -> CryptoResult<Self> {
        validate_hex_secret(value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessSecret(REDACTED)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> KdfParams {
        KdfParams {
            iterations: 1_000,
            hash: KdfHash::Sha256,
        }
    }

    #[test]
    fn derivation_is_deterministic_given_identical_params() {
        let salt = Salt::random();
        let a = derive_wrapping_key("correct-horse", &salt, &fast_params()).unwrap();
        let b = derive_wrapping_key("correct-horse", &salt, &fast_params()).unwrap();
        assert_eq!(a.0, b.0);
    }

    #[test]
    fn different_passphrase_derives_different_key() {
        let salt = Salt::random();
        let a = derive_wrapping_key("correct-horse", &salt, &fast_params()).unwrap();
        let b = derive_wrapping_key("wrong-password", &salt, &fast_params()).unwrap();
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn different_salt_derives_different_key() {
        let a = derive_wrapping_key("correct-horse", &Salt::random(), &fast_params()).unwrap();
        let b = derive_wrapping_key("correct-horse", &Salt::random(), &fast_params()).unwrap();
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn zero_iterations_rejected() {
        let params = KdfParams {
            iterations: 0,
            hash: KdfHash::Sha256,
        };
        assert!(derive_wrapping_key("pw", &Salt::random(), &params).is_err());
    }

    #[test]
    fn recovery_key_is_64_lowercase_hex() {
        let key = RecoveryKey::generate();
        assert_eq!(key.as_str().len(), SECRET_HEX_LEN);
        assert!(key
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn recovery_key_parse_rejects_bad_formats() {
        assert!(RecoveryKey::parse("short").is_err());
        assert!(RecoveryKey::parse(&"G".repeat(64)).is_err());
        assert!(RecoveryKey::parse(&"A1".repeat(32)).is_err(), "uppercase hex rejected");

        let valid = RecoveryKey::generate();
        assert!(RecoveryKey::parse(valid.as_str()).is_ok());
    }

    #[test]
    fn random_keys_are_unique() {
        let a = generate_master_key();
        let b = generate_master_key();
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn key_debug_does_not_leak_bytes() {
        for debug_str in [
            format!("{:?}", generate_master_key()),
            format!("{:?}", generate_dek()),
            format!("{:?}", RecoveryKey::generate()),
            format!("{:?}", AccessSecret::generate()),
        ] {
            assert!(debug_str.contains("REDACTED"), "got: {debug_str}");
        }
    }

    #[test]
    fn kdf_params_serialize_with_standard_hash_names() {
        let json = serde_json::to_string(&KdfParams::default()).unwrap();
        assert!(json.contains("\"SHA-256\""));
        assert!(json.contains("600000"));
    }
}
