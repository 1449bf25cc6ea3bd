//! Whitelisted assets sub-client: every result is integrity-verified.

use crate::client::ProtectClient;
use crate::domain::asset::WhitelistedAsset;
use crate::error::{HttpError, SdkError};
use crate::http::ListQuery;

pub struct Assets<'a> {
    pub(crate) client: &'a ProtectClient,
}

impl<'a> Assets<'a> {
    pub async fn get(&self, id: &str) -> Result<WhitelistedAsset, SdkError> {
        let resp = self.client.http.get_whitelisted_asset(id).await?;
        let dto = resp
            .result
            .ok_or_else(|| HttpError::NotFound(format!("Whitelisted asset not found: {id}")))?;
        self.client.verifier.verify_asset(&dto).await
    }

    /// One page of assets. Fails on the first entry that does not verify.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<WhitelistedAsset>, SdkError> {
        let resp = self.client.http.list_whitelisted_assets(query).await?;
        self.client.verifier.verify_assets(&resp.result).await
    }
}
