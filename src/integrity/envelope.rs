//! Signed envelopes: a payload, its hash, and the signature records over it.
//!
//! The API nests these pieces differently for addresses and assets; both are
//! flattened into [`SignedEnvelope`] before any verification happens.

use serde::{Deserialize, Serialize};

use crate::crypto::ct_eq_str;
use crate::error::WhitelistError;

/// Administrative data plus its cryptographic provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub payload_as_string: String,
    pub hash: String,
    pub signatures: Vec<SignatureRecord>,
    pub trails: Vec<Trail>,
}

/// One approval: a signature over the canonical form of `hashes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRecord {
    /// Governance user claimed as signer, when the API reports one.
    pub user_id: Option<String>,
    /// Base64 raw `r‖s`.
    pub signature: String,
    pub hashes: Vec<String>,
}

impl SignatureRecord {
    /// Whether this record attests to `hash`.
    pub fn covers(&self, hash: &str) -> bool {
        self.hashes
            .iter()
            .fold(false, |found, h| ct_eq_str(h, hash) | found)
    }
}

/// Audit trail entry. Never security relevant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trail {
    pub action: String,
    pub date: Option<String>,
    pub comment: Option<String>,
}

impl SignedEnvelope {
    /// Assemble an envelope from the API's metadata, signature and trail sections.
    ///
    /// A hash without a payload (or a payload without a hash) is an explicit
    /// error, never "no data".
    pub fn from_parts(
        metadata: Option<&EnvelopeMetadataDto>,
        signed: Option<&SignedPayloadDto>,
        trails: &[TrailDto],
    ) -> Result<Self, WhitelistError> {
        let metadata = metadata.ok_or(WhitelistError::MissingEnvelope)?;
        let hash = non_empty(&metadata.hash);
        let payload = non_empty(&metadata.payload_as_string);

        let (hash, payload) = match (hash, payload) {
            (Some(h), Some(p)) => (h, p),
            (Some(_), None) => return Err(WhitelistError::MissingPayload),
            (None, Some(_)) => return Err(WhitelistError::MissingHash),
            (None, None) => return Err(WhitelistError::MissingEnvelope),
        };

        let signatures: Vec<SignatureRecord> = signed
            .map(|s| s.signatures.iter().filter_map(SignatureRecord::from_dto).collect())
            .unwrap_or_default();
        if signatures.is_empty() {
            return Err(WhitelistError::MissingSignatures);
        }

        Ok(Self {
            payload_as_string: payload.to_string(),
            hash: hash.to_string(),
            signatures,
            trails: trails.iter().map(Trail::from).collect(),
        })
    }

    /// Date of the first trail entry with `action`, case-insensitive.
    pub fn trail_date(&self, action: &str) -> Option<&str> {
        self.trails
            .iter()
            .find(|t| t.action.eq_ignore_ascii_case(action))
            .and_then(|t| t.date.as_deref())
    }
}

impl SignatureRecord {
    fn from_dto(dto: &SignatureRecordDto) -> Option<Self> {
        let sig = dto.signature.as_ref()?;
        if sig.signature.is_empty() {
            return None;
        }
        Some(Self {
            user_id: sig.user_id.clone().filter(|u| !u.is_empty()),
            signature: sig.signature.clone(),
            hashes: dto.hashes.clone(),
        })
    }
}

impl From<&TrailDto> for Trail {
    fn from(dto: &TrailDto) -> Self {
        Self {
            action: dto.action.clone().unwrap_or_default(),
            date: dto.date.clone(),
            comment: dto.comment.clone(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

// ─── Wire ────────────────────────────────────────────────────────────────────

/// `metadata` section: the signed hash and the exact payload string it covers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadataDto {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub payload_as_string: Option<String>,
}

/// `signedAddress` / `signedContractAddress` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignedPayloadDto {
    #[serde(default)]
    pub signatures: Vec<SignatureRecordDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureRecordDto {
    #[serde(default)]
    pub signature: Option<UserSignatureDto>,
    #[serde(default)]
    pub hashes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSignatureDto {
    #[serde(default)]
    pub user_id: Option<String>,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailDto {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}
