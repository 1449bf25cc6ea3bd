//! Wire types for request endpoints.

use serde::{Deserialize, Serialize};

use crate::integrity::envelope::EnvelopeMetadataDto;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub request_type: Option<String>,
    #[serde(default)]
    pub metadata: Option<EnvelopeMetadataDto>,
}

/// Response from `GET /api/rest/v1/requests/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestResponse {
    #[serde(default)]
    pub result: Option<RequestDto>,
}

/// Body of `POST /api/rest/v1/requests/approve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveRequestsBody {
    pub ids: Vec<String>,
    /// Base64 raw `r‖s` over the sorted request hashes.
    pub signature: String,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequestsResponse {
    /// Number of signatures recorded, as reported by the API.
    #[serde(default)]
    pub signatures: Option<String>,
}
