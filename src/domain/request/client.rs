//! Requests sub-client: fetch with hash verification, approve.

use crate::client::ProtectClient;
use crate::crypto::keys::PrivateKeyMaterial;
use crate::domain::request::wire::ApproveRequestsResponse;
use crate::domain::request::{approval_body, VerifiedRequest};
use crate::error::{HttpError, SdkError};

pub struct Requests<'a> {
    pub(crate) client: &'a ProtectClient,
}

impl<'a> Requests<'a> {
    /// Fetch a request and check its metadata hash.
    pub async fn get(&self, id: &str) -> Result<VerifiedRequest, SdkError> {
        let resp = self.client.http.get_request(id).await?;
        let dto = resp
            .result
            .ok_or_else(|| HttpError::NotFound(format!("Request not found: {id}")))?;
        VerifiedRequest::verify(&dto)
    }

    /// Approve `requests` with a signature over their hashes.
    pub async fn approve(
        &self,
        key: &PrivateKeyMaterial,
        requests: &[VerifiedRequest],
        comment: &str,
    ) -> Result<ApproveRequestsResponse, SdkError> {
        let body = approval_body(key, requests, comment)?;
        Ok(self.client.http.approve_requests(&body).await?)
    }
}
