//! Wire types for whitelisted asset (contract) responses and the signed payload.

use serde::{Deserialize, Deserializer, Serialize};

use crate::integrity::envelope::{EnvelopeMetadataDto, SignedPayloadDto, TrailDto};

// ─── REST ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistedAssetDto {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "currency")]
    pub blockchain: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rule: Option<String>,
    #[serde(default)]
    pub metadata: Option<EnvelopeMetadataDto>,
    #[serde(default)]
    pub signed_contract_address: Option<SignedPayloadDto>,
    #[serde(default)]
    pub trails: Vec<TrailDto>,
}

/// Response from `GET /api/rest/v1/whitelisted_contracts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistedAssetResponse {
    #[serde(default)]
    pub result: Option<WhitelistedAssetDto>,
}

/// Response from `GET /api/rest/v1/whitelisted_contracts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistedAssetsResponse {
    #[serde(default)]
    pub result: Vec<WhitelistedAssetDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<String>,
}

// ─── Signed payload ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPayload {
    #[serde(default, alias = "currency")]
    pub blockchain: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub kind_type: Option<String>,
    #[serde(default, rename = "isNFT")]
    pub is_nft: Option<bool>,
}

/// Older payloads carry `decimals` as a string.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
