//! Request domain: hash-verified requests and approval signatures.
//!
//! A request's metadata carries `payloadAsString` and its SHA-256. Approving
//! means signing the sorted list of those hashes, so the hash is recomputed
//! before anything is signed.

#[cfg(feature = "http")]
pub mod client;
pub mod wire;

use serde::{Deserialize, Serialize};

use crate::crypto::keys::PrivateKeyMaterial;
use crate::crypto::{ct_eq_str, sha256_hex};
use crate::error::{IntegrityError, SdkError, WhitelistError};
use crate::integrity::threshold::sign_hashes;
use wire::{ApproveRequestsBody, RequestDto};

/// A request whose metadata hash matched its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedRequest {
    pub id: String,
    pub status: Option<String>,
    pub request_type: Option<String>,
    pub hash: String,
    pub payload_as_string: String,
}

/// `sha256(payload)` must equal `provided`. The mismatch error carries both
/// values; neither is secret.
pub fn verify_request_hash(payload: &str, provided: &str) -> Result<(), IntegrityError> {
    let computed = sha256_hex(payload.as_bytes());
    if ct_eq_str(&computed, provided) {
        Ok(())
    } else {
        Err(IntegrityError::RequestHashMismatch {
            computed,
            provided: provided.to_string(),
        })
    }
}

impl VerifiedRequest {
    pub fn verify(dto: &RequestDto) -> Result<Self, SdkError> {
        let metadata = dto.metadata.as_ref().ok_or(WhitelistError::MissingEnvelope)?;
        let hash = metadata
            .hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or(WhitelistError::MissingHash)?;
        let payload = metadata
            .payload_as_string
            .as_deref()
            .ok_or(WhitelistError::MissingPayload)?;

        verify_request_hash(payload, hash).map_err(|e| {
            tracing::warn!(id = %dto.id, step = %e.step(), "request hash rejected");
            e
        })?;

        Ok(Self {
            id: dto.id.clone(),
            status: dto.status.clone(),
            request_type: dto.request_type.clone(),
            hash: hash.to_string(),
            payload_as_string: payload.to_string(),
        })
    }
}

/// Approval body for `requests`, signed with `key` over their sorted hashes.
pub fn approval_body(
    key: &PrivateKeyMaterial,
    requests: &[VerifiedRequest],
    comment: &str,
) -> Result<ApproveRequestsBody, SdkError> {
    if requests.is_empty() {
        return Err(SdkError::Validation("no requests to approve".to_string()));
    }
    let hashes: Vec<&str> = requests.iter().map(|r| r.hash.as_str()).collect();
    let signature = sign_hashes(key, &hashes)?;
    Ok(ApproveRequestsBody {
        ids: requests.iter().map(|r| r.id.clone()).collect(),
        signature,
        comment: comment.to_string(),
    })
}
