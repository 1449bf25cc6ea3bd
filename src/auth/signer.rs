//! TPV1 request signing.
//!
//! Canonical message, space-joined:
//!
//! ```text
//! TPV1 <apiKey> <nonce> <timestamp> <METHOD> <host> <path> [<query>] [<contentType>] [<body>]
//! ```
//!
//! Optional slots are left out entirely when empty. The header is
//! `TPV1-HMAC-SHA256 ApiKey=<apiKey> Nonce=<nonce> Timestamp=<timestamp> Signature=<base64>`
//! where the signature is HMAC-SHA256 of the message under the API secret.
//!
//! The secret lives in a zeroizing buffer that `close()` wipes. This narrows
//! the window in which the secret sits in memory; copies made by the allocator
//! or the OS are out of reach.

use std::fmt;

use zeroize::Zeroizing;

use crate::crypto::hmac_sha256_base64;
use crate::error::{AuthError, ConfigError};

/// Scheme tag at the start of every canonical message.
pub const TPV1_SCHEME: &str = "TPV1";

/// Prefix of the `Authorization` header value.
pub const TPV1_HEADER_PREFIX: &str = "TPV1-HMAC-SHA256";

/// The parts of an outbound request covered by the signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestParts<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub body: Option<&'a str>,
}

/// Signs outbound requests with the API key and secret.
pub struct RequestSigner {
    api_key: String,
    secret: Option<Zeroizing<Vec<u8>>>,
}

impl RequestSigner {
    /// `secret_hex` is the API secret as issued: hex-encoded bytes.
    pub fn new(api_key: impl Into<String>, secret_hex: &str) -> Result<Self, ConfigError> {
        let secret = hex::decode(secret_hex.trim()).map_err(|_| ConfigError::InvalidApiSecret)?;
        Self::from_secret(api_key, secret)
    }

    pub fn from_secret(api_key: impl Into<String>, secret: Vec<u8>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredentials("api key"));
        }
        if secret.is_empty() {
            return Err(ConfigError::MissingCredentials("api secret"));
        }
        Ok(Self {
            api_key,
            secret: Some(Zeroizing::new(secret)),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn is_closed(&self) -> bool {
        self.secret.is_none()
    }

    /// Wipe the secret. Signing fails afterwards.
    pub fn close(&mut self) {
        // Dropping the `Zeroizing` buffer overwrites it.
        self.secret.take();
    }

    /// `Authorization` header for `parts`, with a fresh nonce and the current time.
    pub fn sign(&self, parts: &RequestParts<'_>) -> Result<String, AuthError> {
        let nonce = uuid::Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().timestamp_millis();
        self.sign_at(&nonce, timestamp, parts)
    }

    /// `Authorization` header for a caller-chosen nonce and timestamp.
    pub fn sign_at(
        &self,
        nonce: &str,
        timestamp_ms: i64,
        parts: &RequestParts<'_>,
    ) -> Result<String, AuthError> {
        let secret = self.secret.as_ref().ok_or(AuthError::SignerClosed)?;
        let message = canonical_message(&self.api_key, nonce, timestamp_ms, parts);
        let signature = hmac_sha256_base64(secret, &message)?;
        Ok(format!(
            "{TPV1_HEADER_PREFIX} ApiKey={} Nonce={nonce} Timestamp={timestamp_ms} Signature={signature}",
            self.api_key
        ))
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("api_key", &self.api_key)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// The exact string that is MACed.
pub fn canonical_message(
    api_key: &str,
    nonce: &str,
    timestamp_ms: i64,
    parts: &RequestParts<'_>,
) -> String {
    let timestamp = timestamp_ms.to_string();
    let method = parts.method.to_ascii_uppercase();
    let mut fields: Vec<&str> = vec![
        TPV1_SCHEME,
        api_key,
        nonce,
        timestamp.as_str(),
        method.as_str(),
        parts.host,
        parts.path,
    ];
    for optional in [parts.query, parts.content_type, parts.body] {
        if let Some(value) = optional.filter(|v| !v.is_empty()) {
            fields.push(value);
        }
    }
    fields.join(" ")
}
