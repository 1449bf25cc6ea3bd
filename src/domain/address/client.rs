//! Whitelisted addresses sub-client: every result is integrity-verified.

use crate::client::ProtectClient;
use crate::domain::address::WhitelistedAddress;
use crate::error::{HttpError, SdkError};
use crate::http::ListQuery;

pub struct Addresses<'a> {
    pub(crate) client: &'a ProtectClient,
}

impl<'a> Addresses<'a> {
    pub async fn get(&self, id: &str) -> Result<WhitelistedAddress, SdkError> {
        let resp = self.client.http.get_whitelisted_address(id).await?;
        let dto = resp
            .result
            .ok_or_else(|| HttpError::NotFound(format!("Whitelisted address not found: {id}")))?;
        self.client.verifier.verify_address(&dto).await
    }

    /// One page of addresses. Fails on the first entry that does not verify.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<WhitelistedAddress>, SdkError> {
        let resp = self.client.http.list_whitelisted_addresses(query).await?;
        self.client.verifier.verify_addresses(&resp.result).await
    }
}
