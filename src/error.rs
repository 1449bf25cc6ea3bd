//! Unified SDK error types.

use std::sync::Arc;

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Whitelist error: {0}")]
    Whitelist(#[from] WhitelistError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A single-flight rules refresh failed; every caller waiting on that refresh
    /// receives the same underlying error.
    #[error("Rules container refresh failed: {0}")]
    RulesRefresh(Arc<SdkError>),

    #[error("{0}")]
    Other(String),
}

impl SdkError {
    /// The integrity error behind this error, looking through shared refresh failures.
    pub fn as_integrity(&self) -> Option<&IntegrityError> {
        match self {
            SdkError::Integrity(e) => Some(e),
            SdkError::RulesRefresh(inner) => inner.as_integrity(),
            _ => None,
        }
    }

    /// The configuration error behind this error, looking through shared refresh failures.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            SdkError::Config(e) => Some(e),
            SdkError::RulesRefresh(inner) => inner.as_config(),
            _ => None,
        }
    }
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Request signing failed: {0}")]
    Signing(#[from] AuthError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Fatal configuration problems. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unsupported curve {oid}: only P-256 (secp256r1) keys are accepted")]
    UnsupportedCurve { oid: String },

    #[error("Key is not an elliptic-curve key (algorithm {oid})")]
    NotAnEcKey { oid: String },

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Minimum valid signatures must be positive, got {0}")]
    InvalidMinValidSignatures(usize),

    #[error("Minimum valid signatures ({min}) exceeds the number of configured keys ({keys})")]
    ThresholdExceedsKeys { min: usize, keys: usize },

    #[error("Rules cache TTL must be positive")]
    InvalidCacheTtl,

    #[error("No SuperAdmin public keys configured")]
    MissingSuperAdminKeys,

    #[error("Missing API credentials: {0}")]
    MissingCredentials(&'static str),

    #[error("API secret must be hex-encoded")]
    InvalidApiSecret,
}

/// Verification state that produced an integrity rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStep {
    HashCheck,
    ContainerVerify,
    HashCoverage,
    SignatureThresholds,
    ParsePayload,
}

impl VerificationStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HashCheck => "hash_check",
            Self::ContainerVerify => "container_verify",
            Self::HashCoverage => "hash_coverage",
            Self::SignatureThresholds => "signature_thresholds",
            Self::ParsePayload => "parse_payload",
        }
    }
}

impl std::fmt::Display for VerificationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Security-critical verification failures. Never retried automatically.
///
/// Only [`IntegrityError::RequestHashMismatch`] carries hash values; whitelist and
/// asset failures never echo payload-derived material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Payload hash does not match the signed hash")]
    HashMismatch,

    #[error("Request hash mismatch: computed {computed}, provided {provided}")]
    RequestHashMismatch { computed: String, provided: String },

    #[error("Insufficient valid signatures: {valid} valid, {required} required")]
    InsufficientSignatures { valid: usize, required: usize },

    #[error("Rules container is missing")]
    RulesContainerMissing,

    #[error("Rules container is malformed: {0}")]
    MalformedRulesContainer(String),

    #[error("Payload hash is not covered by any signature")]
    HashNotCovered,

    #[error("No governance rule applies to this entity")]
    NoApplicableRule,

    #[error("Governance signature thresholds are not met")]
    ThresholdNotMet,
}

impl IntegrityError {
    /// The verification state this failure belongs to.
    pub fn step(&self) -> VerificationStep {
        match self {
            Self::HashMismatch | Self::RequestHashMismatch { .. } => VerificationStep::HashCheck,
            Self::InsufficientSignatures { .. }
            | Self::RulesContainerMissing
            | Self::MalformedRulesContainer(_) => VerificationStep::ContainerVerify,
            Self::HashNotCovered => VerificationStep::HashCoverage,
            Self::NoApplicableRule | Self::ThresholdNotMet => VerificationStep::SignatureThresholds,
        }
    }
}

/// Whitelist envelope errors: the data is structurally unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WhitelistError {
    #[error("Envelope has a hash but no payload")]
    MissingPayload,

    #[error("Envelope has a payload but no hash")]
    MissingHash,

    #[error("Entity carries no signed envelope")]
    MissingEnvelope,

    #[error("Envelope carries no signatures")]
    MissingSignatures,

    #[error("Payload is not valid JSON: {0}")]
    MalformedPayload(String),
}

/// Signature codec, MAC and encoding errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Malformed DER signature: {0}")]
    MalformedDer(&'static str),

    #[error("Raw signature must be 64 bytes, got {0}")]
    InvalidRawLength(usize),

    #[error("Invalid MAC key: {0}")]
    InvalidMacKey(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// Authentication errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Request signer has been closed")]
    SignerClosed,

    #[error("Request MAC failed: {0}")]
    Mac(#[from] CryptoError),
}
