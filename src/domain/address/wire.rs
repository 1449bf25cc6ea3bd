//! Wire types for whitelisted address responses (REST) and the signed payload.

use serde::{Deserialize, Serialize};

use crate::integrity::envelope::{EnvelopeMetadataDto, SignedPayloadDto, TrailDto};

// ─── REST ────────────────────────────────────────────────────────────────────

/// Whitelisted address as returned by the API. Only `metadata.payloadAsString`
/// is trusted, and only after verification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistedAddressDto {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "currency")]
    pub blockchain: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub rule: Option<String>,
    #[serde(default)]
    pub metadata: Option<EnvelopeMetadataDto>,
    #[serde(default)]
    pub signed_address: Option<SignedPayloadDto>,
    #[serde(default)]
    pub trails: Vec<TrailDto>,
}

/// Response from `GET /api/rest/v1/whitelisted_addresses/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistedAddressResponse {
    #[serde(default)]
    pub result: Option<WhitelistedAddressDto>,
}

/// Response from `GET /api/rest/v1/whitelisted_addresses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistedAddressesResponse {
    #[serde(default)]
    pub result: Vec<WhitelistedAddressDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<String>,
}

// ─── Signed payload ──────────────────────────────────────────────────────────

/// Fields of the signed `payloadAsString`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    #[serde(default, alias = "currency")]
    pub blockchain: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub address_type: Option<String>,
    #[serde(default)]
    pub exchange_account_id: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub linked_internal_addresses: Vec<LinkedAddressPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedAddressPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}
