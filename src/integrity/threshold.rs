//! Threshold multi-signature verification.
//!
//! One primitive, [`find_signer`], answers "which key (if any) produced this
//! signature over this data". Everything else composes it:
//!
//! - [`is_valid_signature`]: one key suffices.
//! - [`count_valid`] / [`verify_threshold`]: N-of-M over a signature set.
//! - [`sign_hashes`] / [`check_hashes_signature`]: attestation over a hash list.

use std::collections::HashSet;

use crate::crypto::ecdsa;
use crate::crypto::keys::{PrivateKeyMaterial, PublicKeyMaterial};
use crate::error::{CryptoError, IntegrityError};

/// Index of the first key in `keys` that verifies `signature_b64` over `data`.
pub fn find_signer(data: &[u8], signature_b64: &str, keys: &[PublicKeyMaterial]) -> Option<usize> {
    keys.iter()
        .position(|key| ecdsa::verify(key, data, signature_b64))
}

/// Whether any key in `keys` verifies `signature_b64` over `data`.
pub fn is_valid_signature(data: &[u8], signature_b64: &str, keys: &[PublicKeyMaterial]) -> bool {
    find_signer(data, signature_b64, keys).is_some()
}

/// Number of valid signatures in `signatures`, counted once per distinct signing key.
///
/// Every signature is examined; the key search stops at the first match. A
/// repeated or re-encoded signature from an already-counted key adds nothing.
pub fn count_valid<S: AsRef<str>>(
    data: &[u8],
    signatures: &[S],
    keys: &[PublicKeyMaterial],
) -> usize {
    let mut signers = HashSet::new();
    for sig in signatures {
        if let Some(index) = find_signer(data, sig.as_ref(), keys) {
            signers.insert(index);
        }
    }
    signers.len()
}

/// Fail with [`IntegrityError::InsufficientSignatures`] unless at least
/// `min_valid` signatures verify.
pub fn verify_threshold<S: AsRef<str>>(
    data: &[u8],
    signatures: &[S],
    keys: &[PublicKeyMaterial],
    min_valid: usize,
) -> Result<usize, IntegrityError> {
    let valid = count_valid(data, signatures, keys);
    if valid < min_valid {
        return Err(IntegrityError::InsufficientSignatures {
            valid,
            required: min_valid,
        });
    }
    Ok(valid)
}

// ─── Hash-list attestations ──────────────────────────────────────────────────

/// Canonical signed form of a hash list: compact JSON array of the sorted hashes.
pub fn canonical_hashes<S: AsRef<str>>(hashes: &[S]) -> Result<String, CryptoError> {
    let mut sorted: Vec<&str> = hashes.iter().map(|h| h.as_ref()).collect();
    sorted.sort_unstable();
    serde_json::to_string(&sorted).map_err(|e| CryptoError::Encoding(e.to_string()))
}

/// Sign the canonical form of `hashes` (request and pledge approvals).
pub fn sign_hashes<S: AsRef<str>>(
    key: &PrivateKeyMaterial,
    hashes: &[S],
) -> Result<String, CryptoError> {
    ecdsa::sign(key, canonical_hashes(hashes)?.as_bytes())
}

/// Whether `signature_b64` attests to exactly `hashes` under `key`.
pub fn check_hashes_signature<S: AsRef<str>>(
    hashes: &[S],
    signature_b64: &str,
    key: &PublicKeyMaterial,
) -> bool {
    canonical_hashes(hashes)
        .map(|message| ecdsa::verify(key, message.as_bytes(), signature_b64))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use p256::ecdsa::SigningKey;
    use rand::rngs::OsRng;

    fn keys(n: usize) -> Vec<PrivateKeyMaterial> {
        (0..n)
            .map(|_| PrivateKeyMaterial::from(SigningKey::random(&mut OsRng)))
            .collect()
    }

    fn publics(keys: &[PrivateKeyMaterial]) -> Vec<PublicKeyMaterial> {
        keys.iter().map(PrivateKeyMaterial::public_key).collect()
    }

    fn corrupt(sig: &str) -> String {
        let mut raw = BASE64.decode(sig).unwrap();
        raw[0] ^= 0xff;
        BASE64.encode(raw)
    }

    #[test]
    fn test_count_valid_mixed_set_any_order() {
        let signers = keys(3);
        let public = publics(&signers);
        let data = b"rules-container";

        let valid: Vec<String> = signers
            .iter()
            .map(|k| ecdsa::sign(k, data).unwrap())
            .collect();
        let invalid = vec![corrupt(&valid[0]), "garbage".to_string()];

        let mut all: Vec<String> = valid.iter().chain(invalid.iter()).cloned().collect();
        assert_eq!(count_valid(data, &all, &public), 3);

        all.reverse();
        assert_eq!(count_valid(data, &all, &public), 3);

        let interleaved = vec![
            invalid[0].clone(),
            valid[1].clone(),
            invalid[1].clone(),
            valid[0].clone(),
        ];
        assert_eq!(count_valid(data, &interleaved, &public), 2);
    }

    #[test]
    fn test_verify_threshold_fails_iff_below_minimum() {
        let signers = keys(2);
        let public = publics(&signers);
        let data = b"container";
        let sigs: Vec<String> = signers
            .iter()
            .map(|k| ecdsa::sign(k, data).unwrap())
            .collect();

        assert_eq!(verify_threshold(data, &sigs, &public, 2), Ok(2));
        assert_eq!(
            verify_threshold(data, &sigs, &public, 3),
            Err(IntegrityError::InsufficientSignatures {
                valid: 2,
                required: 3
            })
        );
        assert_eq!(
            verify_threshold(b"other", &sigs, &public, 1),
            Err(IntegrityError::InsufficientSignatures {
                valid: 0,
                required: 1
            })
        );
    }

    #[test]
    fn test_duplicate_signature_counted_once() {
        let signers = keys(2);
        let public = publics(&signers);
        let sig = ecdsa::sign(&signers[0], b"data").unwrap();
        let again = ecdsa::sign(&signers[0], b"data").unwrap();

        let sigs = vec![sig.clone(), sig, again];
        assert_eq!(count_valid(b"data", &sigs, &public), 1);
        assert!(verify_threshold(b"data", &sigs, &public, 2).is_err());
    }

    #[test]
    fn test_find_signer_returns_matching_index() {
        let signers = keys(3);
        let public = publics(&signers);
        let sig = ecdsa::sign(&signers[2], b"x").unwrap();
        assert_eq!(find_signer(b"x", &sig, &public), Some(2));
        assert_eq!(find_signer(b"y", &sig, &public), None);
    }

    #[test]
    fn test_canonical_hashes_sorted_compact() {
        assert_eq!(canonical_hashes(&["b", "a", "c"]).unwrap(), r#"["a","b","c"]"#);
        assert_eq!(canonical_hashes::<&str>(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_hash_list_signature_is_order_independent() {
        let signer = keys(1).remove(0);
        let public = signer.public_key();
        let sig = sign_hashes(&signer, &["h2", "h1"]).unwrap();

        assert!(check_hashes_signature(&["h1", "h2"], &sig, &public));
        assert!(!check_hashes_signature(&["h1"], &sig, &public));
        assert!(!check_hashes_signature(&["h1", "h2", "h3"], &sig, &public));
    }
}
