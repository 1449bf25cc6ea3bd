//! High-level client: `ProtectClient` with nested sub-client accessors.
//!
//! Sub-clients live next to their domain (`domain/<name>/client.rs`,
//! `governance/client.rs`). This module keeps the builder, the shared rules
//! cache and the accessors.

use crate::auth::RequestSigner;
use crate::config::TrustConfig;
use crate::domain::address::client::Addresses;
use crate::domain::asset::client::Assets;
use crate::domain::request::client::Requests;
use crate::error::{ConfigError, SdkError};
use crate::governance::client::{rules_fetcher, Governance};
use crate::governance::{JsonRulesContainerDecoder, RulesContainerCache, RulesContainerDecoder};
use crate::http::ProtectHttp;
use crate::integrity::WhitelistIntegrityVerifier;

use std::sync::Arc;
use zeroize::Zeroizing;

// Re-export sub-client types for convenience.
pub use crate::domain::address::client::Addresses as AddressesClient;
pub use crate::domain::asset::client::Assets as AssetsClient;
pub use crate::domain::request::client::Requests as RequestsClient;
pub use crate::governance::client::Governance as GovernanceClient;

/// The primary entry point: signed requests out, verified data in.
///
/// `client.governance()`, `client.addresses()`, `client.assets()`, `client.requests()`.
/// Clones share the HTTP layer, the API secret and the rules cache.
#[derive(Debug, Clone)]
pub struct ProtectClient {
    pub(crate) http: ProtectHttp,
    pub(crate) trust: TrustConfig,
    /// Verified rules container, shared by every clone.
    pub(crate) rules: Arc<RulesContainerCache>,
    pub(crate) verifier: WhitelistIntegrityVerifier,
}

impl ProtectClient {
    pub fn builder() -> ProtectClientBuilder {
        ProtectClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn governance(&self) -> Governance<'_> {
        Governance { client: self }
    }

    pub fn addresses(&self) -> Addresses<'_> {
        Addresses { client: self }
    }

    pub fn assets(&self) -> Assets<'_> {
        Assets { client: self }
    }

    pub fn requests(&self) -> Requests<'_> {
        Requests { client: self }
    }

    pub fn trust(&self) -> &TrustConfig {
        &self.trust
    }

    pub fn verifier(&self) -> &WhitelistIntegrityVerifier {
        &self.verifier
    }

    /// Wipe the API secret and drop the cached rules. Every clone is affected;
    /// requests made afterwards fail without being sent.
    pub async fn close(&self) {
        self.http.close().await;
        self.rules.clear().await;
        tracing::debug!("client closed");
    }

    pub async fn is_closed(&self) -> bool {
        self.http.is_closed().await
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct ProtectClientBuilder {
    base_url: String,
    api_key: Option<String>,
    api_secret: Option<Zeroizing<String>>,
    trust: Option<TrustConfig>,
    decoder: Arc<dyn RulesContainerDecoder>,
}

impl Default for ProtectClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            api_key: None,
            api_secret: None,
            trust: None,
            decoder: Arc::new(JsonRulesContainerDecoder),
        }
    }
}

impl ProtectClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// API key and hex-encoded API secret.
    pub fn credentials(mut self, api_key: &str, api_secret_hex: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self.api_secret = Some(Zeroizing::new(api_secret_hex.to_string()));
        self
    }

    pub fn trust(mut self, trust: TrustConfig) -> Self {
        self.trust = Some(trust);
        self
    }

    /// Decoder for the rules container format. Defaults to JSON.
    pub fn rules_decoder(mut self, decoder: Arc<dyn RulesContainerDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn build(self) -> Result<ProtectClient, SdkError> {
        let trust = self.trust.ok_or(ConfigError::MissingSuperAdminKeys)?;
        let api_key = self.api_key.ok_or(ConfigError::MissingCredentials("api key"))?;
        let api_secret = self
            .api_secret
            .ok_or(ConfigError::MissingCredentials("api secret"))?;

        let signer = RequestSigner::new(api_key, &api_secret)?;
        let http = ProtectHttp::new(&self.base_url, signer)?;

        let rules = Arc::new(RulesContainerCache::new(
            trust.rules_cache_ttl(),
            rules_fetcher(http.clone(), &trust, self.decoder),
        )?);
        let verifier = WhitelistIntegrityVerifier::new(Arc::clone(&rules));

        Ok(ProtectClient {
            http,
            trust,
            rules,
            verifier,
        })
    }
}
