//! SHA-256 digests and HMAC-SHA256 message authentication.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Lowercase hex SHA-256 digest (64 characters).
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// HMAC-SHA256 of `message` under `key`, base64-encoded (standard alphabet, padded).
pub fn hmac_sha256_base64(key: &[u8], message: &str) -> Result<String, CryptoError> {
    let mut mac = <HmacSha256 as KeyInit>::new_from_slice(key)
        .map_err(|e| CryptoError::InvalidMacKey(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_sha256_hex_empty() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hmac_rfc4231_case_2() {
        // RFC 4231 test case 2: key "Jefe", data "what do ya want for nothing?"
        let mac = hmac_sha256_base64(b"Jefe", "what do ya want for nothing?").unwrap();
        let expected = hex::decode(
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843",
        )
        .unwrap();
        assert_eq!(mac, BASE64.encode(expected));
    }

    #[test]
    fn test_hmac_deterministic_and_key_sensitive() {
        let a = hmac_sha256_base64(b"key-a", "message").unwrap();
        assert_eq!(a, hmac_sha256_base64(b"key-a", "message").unwrap());
        assert_ne!(a, hmac_sha256_base64(b"key-b", "message").unwrap());
    }

    #[test]
    fn test_hmac_accepts_empty_and_long_keys() {
        assert!(hmac_sha256_base64(b"", "message").is_ok());
        assert!(hmac_sha256_base64(&[7u8; 200], "message").is_ok());
    }
}
