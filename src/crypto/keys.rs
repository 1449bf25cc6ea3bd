//! P-256 key material decoding.
//!
//! Keys arrive as PEM documents (SPKI `PUBLIC KEY`, PKCS#8 `PRIVATE KEY`, SEC1
//! `EC PRIVATE KEY`) or as base64 of either the DER bytes or a whole PEM document.
//! The named curve is checked explicitly: a key on any curve other than P-256 is a
//! [`ConfigError::UnsupportedCurve`], never a verification failure.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::pkcs8::der::{pem, Decode};
use p256::pkcs8::spki::{ObjectIdentifier, SubjectPublicKeyInfoRef};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding, PrivateKeyInfo};

use crate::error::ConfigError;

/// `id-ecPublicKey` (RFC 5480).
const ID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// `secp256r1` / `prime256v1` / NIST P-256.
const SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

// ─── Public keys ─────────────────────────────────────────────────────────────

/// A P-256 public key used to verify administrator and HSM signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial {
    key: VerifyingKey,
}

impl PublicKeyMaterial {
    /// Decode a `-----BEGIN PUBLIC KEY-----` (SPKI) document.
    pub fn from_pem(pem: &str) -> Result<Self, ConfigError> {
        let (label, der) = decode_pem(pem)?;
        if label != "PUBLIC KEY" {
            return Err(ConfigError::InvalidKey(format!(
                "expected PUBLIC KEY PEM, found {label}"
            )));
        }
        Self::from_der(&der)
    }

    /// Decode DER-encoded SPKI bytes.
    pub fn from_der(der: &[u8]) -> Result<Self, ConfigError> {
        let spki = SubjectPublicKeyInfoRef::from_der(der)
            .map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
        if spki.algorithm.oid != ID_EC_PUBLIC_KEY {
            return Err(ConfigError::NotAnEcKey {
                oid: spki.algorithm.oid.to_string(),
            });
        }
        let curve = spki
            .algorithm
            .parameters_oid()
            .map_err(|e| ConfigError::InvalidKey(format!("missing named curve: {e}")))?;
        if curve != SECP256R1 {
            return Err(ConfigError::UnsupportedCurve {
                oid: curve.to_string(),
            });
        }

        let key = VerifyingKey::from_public_key_der(der)
            .map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Decode base64 of either DER SPKI bytes or a full PEM document.
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| ConfigError::InvalidKey(format!("invalid base64: {e}")))?;
        if bytes.starts_with(b"-----BEGIN") {
            let pem = std::str::from_utf8(&bytes)
                .map_err(|_| ConfigError::InvalidKey("PEM is not UTF-8".into()))?;
            return Self::from_pem(pem);
        }
        Self::from_der(&bytes)
    }

    /// Decode either a PEM document or base64-encoded key, whichever `input` is.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        if input.trim_start().starts_with("-----BEGIN") {
            Self::from_pem(input)
        } else {
            Self::from_base64(input)
        }
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.key
    }

    /// Re-encode as an SPKI PEM document.
    pub fn to_pem(&self) -> Result<String, ConfigError> {
        self.key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| ConfigError::InvalidKey(e.to_string()))
    }
}

impl From<VerifyingKey> for PublicKeyMaterial {
    fn from(key: VerifyingKey) -> Self {
        Self { key }
    }
}

// ─── Private keys ────────────────────────────────────────────────────────────

/// A P-256 private key used for approval signing. The inner key zeroizes on drop.
#[derive(Clone)]
pub struct PrivateKeyMaterial {
    key: SigningKey,
}

impl PrivateKeyMaterial {
    /// Decode a PKCS#8 (`PRIVATE KEY`) or SEC1 (`EC PRIVATE KEY`) PEM document.
    pub fn from_pem(pem: &str) -> Result<Self, ConfigError> {
        let (label, der) = decode_pem(pem)?;
        match label.as_str() {
            "PRIVATE KEY" => Self::from_pkcs8_der(&der),
            "EC PRIVATE KEY" => {
                let secret = p256::SecretKey::from_sec1_der(&der)
                    .map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
                Ok(Self {
                    key: SigningKey::from(secret),
                })
            }
            other => Err(ConfigError::InvalidKey(format!(
                "expected PRIVATE KEY or EC PRIVATE KEY PEM, found {other}"
            ))),
        }
    }

    /// Decode PKCS#8 DER bytes.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, ConfigError> {
        let info =
            PrivateKeyInfo::from_der(der).map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
        if info.algorithm.oid != ID_EC_PUBLIC_KEY {
            return Err(ConfigError::NotAnEcKey {
                oid: info.algorithm.oid.to_string(),
            });
        }
        let curve = info
            .algorithm
            .parameters_oid()
            .map_err(|e| ConfigError::InvalidKey(format!("missing named curve: {e}")))?;
        if curve != SECP256R1 {
            return Err(ConfigError::UnsupportedCurve {
                oid: curve.to_string(),
            });
        }

        let key =
            SigningKey::from_pkcs8_der(der).map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.key
    }

    pub fn public_key(&self) -> PublicKeyMaterial {
        PublicKeyMaterial::from(*self.key.verifying_key())
    }
}

impl From<SigningKey> for PrivateKeyMaterial {
    fn from(key: SigningKey) -> Self {
        Self { key }
    }
}

impl std::fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyMaterial")
            .field("key", &"<redacted>")
            .finish()
    }
}

// ─── PEM ─────────────────────────────────────────────────────────────────────

/// Split a PEM document into its label and decoded DER body.
fn decode_pem(input: &str) -> Result<(String, Vec<u8>), ConfigError> {
    let (label, der) = pem::decode_vec(input.trim().as_bytes())
        .map_err(|e| ConfigError::InvalidKey(format!("invalid PEM: {e}")))?;
    Ok((label.to_string(), der))
}
