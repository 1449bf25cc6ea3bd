//! ECDSA-SHA256 over P-256 with the raw `r‖s` wire format.
//!
//! The API exchanges signatures as base64 of the 64-byte concatenation of `r` and
//! `s` (each 32 bytes, big-endian, zero-padded), not DER. The signature primitive
//! works in DER, so signing converts DER→raw and verification converts raw→DER.
//!
//! ## Security Notes
//!
//! - DER parsing validates every length field against the remaining buffer
//!   before indexing and rejects indefinite-length encodings.
//! - `verify` maps only format errors and the primitive's `signature::Error` to
//!   `false`. Key curves are checked when [`PublicKeyMaterial`] is decoded, so a
//!   wrong-curve key never reaches this module.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::Signature;

use crate::crypto::keys::{PrivateKeyMaterial, PublicKeyMaterial};
use crate::error::CryptoError;

/// Length of a raw P-256 signature (`r‖s`).
pub const RAW_SIGNATURE_LEN: usize = 64;

/// Length of one scalar component.
const COMPONENT_LEN: usize = 32;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;

/// Sign `data` and return base64 of the raw 64-byte signature.
pub fn sign(key: &PrivateKeyMaterial, data: &[u8]) -> Result<String, CryptoError> {
    let signature: Signature = key.signing_key().sign(data);
    let der = signature.to_der();
    let raw = der_to_raw(der.as_bytes())?;
    Ok(BASE64.encode(raw))
}

/// Verify a base64 raw signature over `data`.
///
/// Malformed base64, a decoded length other than 64 bytes, and cryptographic
/// rejection all yield `false`.
pub fn verify(key: &PublicKeyMaterial, data: &[u8], signature_b64: &str) -> bool {
    let raw = match BASE64.decode(signature_b64.trim()) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(error = %e, "signature is not valid base64");
            return false;
        }
    };
    verify_raw(key, data, &raw)
}

/// Verify raw `r‖s` signature bytes over `data`.
pub fn verify_raw(key: &PublicKeyMaterial, data: &[u8], raw: &[u8]) -> bool {
    if raw.len() != RAW_SIGNATURE_LEN {
        return false;
    }
    let der = match raw_to_der(raw) {
        Ok(der) => der,
        Err(_) => return false,
    };
    let signature = match Signature::from_der(&der) {
        Ok(signature) => signature,
        Err(_) => return false,
    };
    key.verifying_key().verify(data, &signature).is_ok()
}

// ─── DER ↔ raw ───────────────────────────────────────────────────────────────

/// Convert a DER `SEQUENCE { INTEGER r, INTEGER s }` into raw `r‖s`.
pub fn der_to_raw(der: &[u8]) -> Result<[u8; RAW_SIGNATURE_LEN], CryptoError> {
    if der.len() < 8 {
        return Err(CryptoError::MalformedDer("signature too short"));
    }
    if der[0] != TAG_SEQUENCE {
        return Err(CryptoError::MalformedDer("expected SEQUENCE"));
    }

    let mut pos = 1;
    let seq_len = read_length(der, &mut pos)?;
    if seq_len != der.len() - pos {
        return Err(CryptoError::MalformedDer("SEQUENCE length mismatch"));
    }

    let r = read_integer(der, &mut pos)?;
    let s = read_integer(der, &mut pos)?;
    if pos != der.len() {
        return Err(CryptoError::MalformedDer("trailing bytes"));
    }

    let mut raw = [0u8; RAW_SIGNATURE_LEN];
    write_component(r, &mut raw[..COMPONENT_LEN])?;
    write_component(s, &mut raw[COMPONENT_LEN..])?;
    Ok(raw)
}

/// Convert raw `r‖s` into a minimal DER `SEQUENCE { INTEGER r, INTEGER s }`.
pub fn raw_to_der(raw: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if raw.len() != RAW_SIGNATURE_LEN {
        return Err(CryptoError::InvalidRawLength(raw.len()));
    }

    let r = encode_integer(&raw[..COMPONENT_LEN]);
    let s = encode_integer(&raw[COMPONENT_LEN..]);

    // At most 2 * (2 + 33) = 70 content bytes: always short-form length.
    let mut der = Vec::with_capacity(2 + r.len() + s.len());
    der.push(TAG_SEQUENCE);
    der.push((r.len() + s.len()) as u8);
    der.extend_from_slice(&r);
    der.extend_from_slice(&s);
    Ok(der)
}

fn read_length(buf: &[u8], pos: &mut usize) -> Result<usize, CryptoError> {
    let first = *buf
        .get(*pos)
        .ok_or(CryptoError::MalformedDer("truncated length"))?;
    *pos += 1;

    if first == 0x80 {
        return Err(CryptoError::MalformedDer("indefinite length"));
    }
    if first < 0x80 {
        return Ok(first as usize);
    }

    let count = (first & 0x7f) as usize;
    if count > 2 {
        return Err(CryptoError::MalformedDer("length field too large"));
    }
    if *pos + count > buf.len() {
        return Err(CryptoError::MalformedDer("truncated length"));
    }
    let len = buf[*pos..*pos + count]
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | *b as usize);
    *pos += count;
    Ok(len)
}

fn read_integer<'a>(buf: &'a [u8], pos: &mut usize) -> Result<&'a [u8], CryptoError> {
    match buf.get(*pos) {
        Some(&TAG_INTEGER) => *pos += 1,
        Some(_) => return Err(CryptoError::MalformedDer("expected INTEGER")),
        None => return Err(CryptoError::MalformedDer("truncated INTEGER")),
    }

    let len = read_length(buf, pos)?;
    if len == 0 {
        return Err(CryptoError::MalformedDer("empty INTEGER"));
    }
    if len > buf.len() - *pos {
        return Err(CryptoError::MalformedDer("INTEGER exceeds buffer"));
    }

    let value = &buf[*pos..*pos + len];
    *pos += len;
    Ok(value)
}

/// Left-pad or strip the sign-bit `0x00` so the component is exactly 32 bytes.
fn write_component(value: &[u8], out: &mut [u8]) -> Result<(), CryptoError> {
    let value = match value {
        [0x00, rest @ ..] if value.len() == COMPONENT_LEN + 1 => rest,
        _ => value,
    };
    if value.len() > COMPONENT_LEN {
        return Err(CryptoError::MalformedDer("INTEGER longer than 32 bytes"));
    }
    let offset = COMPONENT_LEN - value.len();
    out[..offset].fill(0);
    out[offset..].copy_from_slice(value);
    Ok(())
}

fn encode_integer(component: &[u8]) -> Vec<u8> {
    let first_nonzero = component
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(component.len() - 1);
    let trimmed = &component[first_nonzero..];

    let mut out = Vec::with_capacity(trimmed.len() + 3);
    out.push(TAG_INTEGER);
    if trimmed[0] & 0x80 != 0 {
        out.push((trimmed.len() + 1) as u8);
        out.push(0x00);
    } else {
        out.push(trimmed.len() as u8);
    }
    out.extend_from_slice(trimmed);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey;
    use rand::rngs::OsRng;

    fn key_pair() -> (PrivateKeyMaterial, PublicKeyMaterial) {
        let private = PrivateKeyMaterial::from(SigningKey::random(&mut OsRng));
        let public = private.public_key();
        (private, public)
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let (private, public) = key_pair();
        let sig = sign(&private, b"payload").unwrap();
        assert_eq!(BASE64.decode(&sig).unwrap().len(), RAW_SIGNATURE_LEN);
        assert!(verify(&public, b"payload", &sig));
    }

    #[test]
    fn test_tampered_data_rejected() {
        let (private, public) = key_pair();
        let sig = sign(&private, b"payload").unwrap();
        assert!(!verify(&public, b"paylaod", &sig));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let (private, public) = key_pair();
        let sig = sign(&private, b"payload").unwrap();
        let mut raw = BASE64.decode(&sig).unwrap();
        raw[10] ^= 0x01;
        assert!(!verify(&public, b"payload", &BASE64.encode(raw)));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let (private, _) = key_pair();
        let (_, other) = key_pair();
        let sig = sign(&private, b"payload").unwrap();
        assert!(!verify(&other, b"payload", &sig));
    }

    #[test]
    fn test_wrong_length_and_bad_base64_rejected() {
        let (_, public) = key_pair();
        assert!(!verify(&public, b"payload", &BASE64.encode([1u8; 63])));
        assert!(!verify(&public, b"payload", &BASE64.encode([1u8; 65])));
        assert!(!verify(&public, b"payload", "%%% not base64 %%%"));
        assert!(!verify(&public, b"payload", ""));
    }

    #[test]
    fn test_der_signature_is_not_accepted_as_raw() {
        let (private, public) = key_pair();
        let signature: Signature = private.signing_key().sign(b"payload");
        let der = BASE64.encode(signature.to_der().as_bytes());
        assert!(!verify(&public, b"payload", &der));
    }

    #[test]
    fn test_raw_der_conversion_preserves_verification() {
        let (private, public) = key_pair();
        let signature: Signature = private.signing_key().sign(b"data");
        let raw = der_to_raw(signature.to_der().as_bytes()).unwrap();
        let der = raw_to_der(&raw).unwrap();

        let reparsed = Signature::from_der(&der).unwrap();
        assert!(public.verifying_key().verify(b"data", &reparsed).is_ok());
        assert_eq!(der_to_raw(&der).unwrap(), raw);
    }

    #[test]
    fn test_der_to_raw_strips_sign_byte_and_pads_short_components() {
        // r = 0x00 || 0x80.. (33 bytes), s = 0x01 (1 byte)
        let mut der = vec![TAG_SEQUENCE, 38, TAG_INTEGER, 33, 0x00, 0x80];
        der.extend_from_slice(&[0x11; 31]);
        der.extend_from_slice(&[TAG_INTEGER, 1, 0x01]);

        let raw = der_to_raw(&der).unwrap();
        assert_eq!(raw[0], 0x80);
        assert_eq!(&raw[1..32], &[0x11; 31]);
        assert_eq!(&raw[32..63], &[0u8; 31]);
        assert_eq!(raw[63], 0x01);
    }

    #[test]
    fn test_der_to_raw_rejects_malformed_input() {
        assert!(der_to_raw(&[0x30, 0x06, 0x02, 0x01, 0x01]).is_err());
        // indefinite length
        assert_eq!(
            der_to_raw(&[0x30, 0x80, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01]),
            Err(CryptoError::MalformedDer("indefinite length"))
        );
        // INTEGER length runs past the buffer
        assert!(der_to_raw(&[0x30, 0x06, 0x02, 0x7f, 0x01, 0x02, 0x01, 0x01]).is_err());
        // wrong outer tag
        assert!(der_to_raw(&[0x31, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01]).is_err());
        // SEQUENCE length disagrees with buffer
        assert!(der_to_raw(&[0x30, 0x20, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01]).is_err());
        // long-form length truncated
        assert!(der_to_raw(&[0x30, 0x82, 0x00, 0x02, 0x01, 0x01, 0x02, 0x01]).is_err());
    }

    #[test]
    fn test_der_to_raw_rejects_oversized_component() {
        let mut der = vec![TAG_SEQUENCE, 39, TAG_INTEGER, 34];
        der.extend_from_slice(&[0x01; 34]);
        der.extend_from_slice(&[TAG_INTEGER, 1, 0x01]);
        assert!(der_to_raw(&der).is_err());
    }

    #[test]
    fn test_raw_to_der_rejects_bad_length() {
        assert_eq!(raw_to_der(&[0u8; 10]), Err(CryptoError::InvalidRawLength(10)));
    }

    #[test]
    fn test_raw_to_der_minimal_encoding() {
        let mut raw = [0u8; 64];
        raw[31] = 0x05;
        raw[32] = 0xff;
        let der = raw_to_der(&raw).unwrap();
        // r = 0x05, s = 0x00 0xff...
        assert_eq!(&der[..5], &[TAG_SEQUENCE, 3 + 35, TAG_INTEGER, 1, 0x05]);
        assert_eq!(&der[5..8], &[TAG_INTEGER, 33, 0x00]);
    }
}
