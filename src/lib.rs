//! # Custody SDK
//!
//! Client-side trust layer for a custody REST API. Outbound requests are
//! authenticated with TPV1 (HMAC-SHA256); inbound administrative data
//! (governance rules, whitelisted addresses and assets) is verified against
//! the configured SuperAdmin keys before it is handed to the caller.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core**: Crypto primitives, threshold signatures, legacy hashes,
//!    governance rules, whitelist verification, domain models (no transport)
//! 2. **Auth**: TPV1 request signing
//! 3. **HTTP API**: `ProtectHttp`, signed requests with per-endpoint retry policies
//! 4. **High-Level Client**: `ProtectClient` with nested sub-clients and the rules cache
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use custody_sdk::prelude::*;
//!
//! let trust = TrustConfig::from_pem_keys(&super_admin_pems, 2)?;
//! let client = ProtectClient::builder()
//!     .base_url("https://api.protect.example.com")
//!     .credentials(&api_key, &api_secret_hex)
//!     .trust(trust)
//!     .build()?;
//!
//! let address = client.addresses().get("1234").await?;
//! client.close().await;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// SHA-256, HMAC, constant-time comparison, P-256 keys and ECDSA.
pub mod crypto;

/// Threshold signatures, legacy hashes, signed envelopes, whitelist verification.
pub mod integrity;

/// Governance rules: SuperAdmin verification, decoded container, TTL cache.
pub mod governance;

/// Domain modules (vertical slices): verified types, wire types, conversions.
pub mod domain;

/// Trust configuration.
pub mod config;

/// Unified SDK error types.
pub mod error;

/// Network URL constants.
pub mod network;

// ── Layer 2: Auth ────────────────────────────────────────────────────────────

/// TPV1 request signing.
pub mod auth;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with TPV1 signing and retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `ProtectClient`: the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Crypto
    pub use crate::crypto::{PrivateKeyMaterial, PublicKeyMaterial};

    // Integrity
    pub use crate::integrity::{
        SignatureRecord, SignedEnvelope, Trail, WhitelistIntegrityVerifier,
    };

    // Governance
    pub use crate::governance::{
        DecodedRulesContainer, GovernanceRules, RulesContainerCache, RulesContainerDecoder,
        VerifiedRulesContainer, DEFAULT_RULES_CACHE_TTL,
    };

    // Domain types
    pub use crate::domain::address::{LinkedAddress, WhitelistedAddress};
    pub use crate::domain::asset::WhitelistedAsset;
    pub use crate::domain::request::VerifiedRequest;

    // Config
    pub use crate::config::{TrustConfig, DEFAULT_MIN_VALID_SIGNATURES};

    // Errors
    pub use crate::error::{
        ConfigError, IntegrityError, SdkError, VerificationStep, WhitelistError,
    };

    // Network
    pub use crate::network::DEFAULT_API_URL;

    // Auth
    pub use crate::auth::{RequestParts, RequestSigner};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        AddressesClient, AssetsClient, GovernanceClient, ProtectClient, ProtectClientBuilder,
        RequestsClient,
    };
    #[cfg(feature = "http")]
    pub use crate::http::{ListQuery, RetryConfig, RetryPolicy};
}
