//! Base64 codec for wrapped keys, IVs, and ciphertext blobs.
//!
//! Everything that crosses the store boundary travels as an opaque base64
//! string; the store never sees structured key material.

use crate::error::{CryptoError, CryptoResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encodes bytes as standard base64.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes standard base64 into bytes.
pub fn from_base64(encoded: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| CryptoError::Encoding(format!("invalid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"\x00\x01\xfe\xffarbitrary bytes";
        assert_eq!(from_base64(&to_base64(data)).unwrap(), data);
    }

    #[test]
    fn large_buffer_round_trip() {
        let data = vec![0xA7u8; 4 * 1024 * 1024];
        assert_eq!(from_base64(&to_base64(&data)).unwrap(), data);
    }

    #[test]
    fn invalid_base64_rejected() {
        assert!(matches!(
            from_base64("not-valid-base64!!!"),
            Err(CryptoError::Encoding(_))
        ));
    }
}
