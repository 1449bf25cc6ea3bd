//! Governance sub-client: raw rules, verified container, cache control.

use std::sync::Arc;

use futures_util::future::FutureExt;

use crate::client::ProtectClient;
use crate::config::TrustConfig;
use crate::crypto::keys::PublicKeyMaterial;
use crate::error::SdkError;
use crate::governance::cache::RulesFetchFuture;
use crate::governance::wire::GovernanceRules;
use crate::governance::{verify_governance_rules, RulesContainerDecoder, VerifiedRulesContainer};
use crate::http::ProtectHttp;

pub struct Governance<'a> {
    pub(crate) client: &'a ProtectClient,
}

impl<'a> Governance<'a> {
    /// Governance rules as served, before any verification.
    pub async fn rules(&self) -> Result<Option<GovernanceRules>, SdkError> {
        Ok(self.client.http.get_governance_rules().await?.result)
    }

    /// The SuperAdmin-verified container. Uses the TTL cache.
    pub async fn verified_rules(&self) -> Result<Arc<VerifiedRulesContainer>, SdkError> {
        self.client.rules.get().await
    }

    /// Fetch and verify now, replacing the cached container.
    pub async fn refresh(&self) -> Result<Arc<VerifiedRulesContainer>, SdkError> {
        self.client.rules.refresh().await
    }

    pub async fn clear_cache(&self) {
        self.client.rules.clear().await;
    }

    /// HSM public keys from the verified container.
    pub async fn hsm_public_keys(&self) -> Result<Vec<PublicKeyMaterial>, SdkError> {
        let container = self.verified_rules().await?;
        Ok(container.hsm_public_keys().into_iter().cloned().collect())
    }
}

/// Fetch function for the rules cache: download, then verify against the
/// SuperAdmin keys. Absent rules resolve to `None`.
pub(crate) fn rules_fetcher(
    http: ProtectHttp,
    trust: &TrustConfig,
    decoder: Arc<dyn RulesContainerDecoder>,
) -> impl Fn() -> RulesFetchFuture + Send + Sync + 'static {
    let keys = trust.shared_keys();
    let min_valid = trust.min_valid_signatures();
    move || {
        let http = http.clone();
        let keys = Arc::clone(&keys);
        let decoder = Arc::clone(&decoder);
        async move {
            let Some(rules) = http.get_governance_rules().await?.result else {
                return Ok(None);
            };
            verify_governance_rules(&rules, &keys, min_valid, decoder.as_ref()).map(Some)
        }
        .boxed()
    }
}
