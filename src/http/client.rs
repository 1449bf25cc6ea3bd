//! Low-level HTTP client: `ProtectHttp`.
//!
//! One method per API endpoint, returning wire types. Every request carries a
//! TPV1 `Authorization` header computed over exactly the method, host, path,
//! query, content type and body that are sent.

use crate::auth::{RequestParts, RequestSigner};
use crate::domain::address::wire::{WhitelistedAddressResponse, WhitelistedAddressesResponse};
use crate::domain::asset::wire::{WhitelistedAssetResponse, WhitelistedAssetsResponse};
use crate::domain::request::wire::{ApproveRequestsBody, ApproveRequestsResponse, RequestResponse};
use crate::error::HttpError;
use crate::governance::wire::GovernanceRulesResponse;
use crate::http::retry::{RetryConfig, RetryPolicy};

use async_lock::RwLock;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Filters for whitelist listings.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub blockchain: Option<String>,
    pub network: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListQuery {
    fn to_query(&self) -> Option<String> {
        let mut params = Vec::new();
        if let Some(b) = &self.blockchain {
            params.push(format!("blockchain={}", urlencoding::encode(b)));
        }
        if let Some(n) = &self.network {
            params.push(format!("network={}", urlencoding::encode(n)));
        }
        if let Some(l) = self.limit {
            params.push(format!("limit={}", l));
        }
        if let Some(o) = self.offset {
            params.push(format!("offset={}", o));
        }
        if params.is_empty() {
            None
        } else {
            Some(params.join("&"))
        }
    }
}

/// Low-level HTTP client for the custody REST API.
#[derive(Clone)]
pub struct ProtectHttp {
    base_url: Url,
    client: Client,
    /// Shared with `ProtectClient::close`. Never exposed.
    signer: Arc<RwLock<RequestSigner>>,
}

impl ProtectHttp {
    pub fn new(base_url: &str, signer: RequestSigner) -> Result<Self, HttpError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        if base_url.host_str().is_none() {
            return Err(HttpError::InvalidUrl(format!("{base_url} has no host")));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            base_url,
            client,
            signer: Arc::new(RwLock::new(signer)),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Wipe the API secret; later requests fail before anything is sent.
    pub(crate) async fn close(&self) {
        self.signer.write().await.close();
    }

    pub(crate) async fn is_closed(&self) -> bool {
        self.signer.read().await.is_closed()
    }

    // ── Governance ───────────────────────────────────────────────────────

    pub async fn get_governance_rules(&self) -> Result<GovernanceRulesResponse, HttpError> {
        self.get("/api/rest/v1/governance_rules", None, RetryPolicy::Idempotent)
            .await
    }

    // ── Whitelisted addresses ────────────────────────────────────────────

    pub async fn get_whitelisted_address(
        &self,
        id: &str,
    ) -> Result<WhitelistedAddressResponse, HttpError> {
        let path = format!("/api/rest/v1/whitelisted_addresses/{}", urlencoding::encode(id));
        self.get(&path, None, RetryPolicy::Idempotent).await
    }

    pub async fn list_whitelisted_addresses(
        &self,
        query: &ListQuery,
    ) -> Result<WhitelistedAddressesResponse, HttpError> {
        self.get(
            "/api/rest/v1/whitelisted_addresses",
            query.to_query(),
            RetryPolicy::Idempotent,
        )
        .await
    }

    // ── Whitelisted assets ───────────────────────────────────────────────

    pub async fn get_whitelisted_asset(
        &self,
        id: &str,
    ) -> Result<WhitelistedAssetResponse, HttpError> {
        let path = format!("/api/rest/v1/whitelisted_contracts/{}", urlencoding::encode(id));
        self.get(&path, None, RetryPolicy::Idempotent).await
    }

    pub async fn list_whitelisted_assets(
        &self,
        query: &ListQuery,
    ) -> Result<WhitelistedAssetsResponse, HttpError> {
        self.get(
            "/api/rest/v1/whitelisted_contracts",
            query.to_query(),
            RetryPolicy::Idempotent,
        )
        .await
    }

    // ── Requests ─────────────────────────────────────────────────────────

    pub async fn get_request(&self, id: &str) -> Result<RequestResponse, HttpError> {
        let path = format!("/api/rest/v1/requests/{}", urlencoding::encode(id));
        self.get(&path, None, RetryPolicy::Idempotent).await
    }

    pub async fn approve_requests(
        &self,
        body: &ApproveRequestsBody,
    ) -> Result<ApproveRequestsResponse, HttpError> {
        self.post("/api/rest/v1/requests/approve", body, RetryPolicy::None)
            .await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<String>,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let url = self.url(path, query.as_deref());
        self.request_with_retry(reqwest::Method::GET, &url, None, retry)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let url = self.url(path, None);
        let body = serde_json::to_string(body)
            .map_err(|e| HttpError::BadRequest(format!("unserializable body: {e}")))?;
        self.request_with_retry(reqwest::Method::POST, &url, Some(body), retry)
            .await
    }

    fn url(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{path}"));
        url.set_query(query);
        url
    }

    async fn request_with_retry<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: &Url,
        body: Option<String>,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let config = match &retry {
            RetryPolicy::None => {
                return self.do_request(&method, url, body.as_deref()).await;
            }
            RetryPolicy::Idempotent => RetryConfig::idempotent(),
            RetryPolicy::Custom(c) => c.clone(),
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_request::<T>(&method, url, body.as_deref()).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let should_retry = match &e {
                        HttpError::ServerError { status, .. } => {
                            config.retryable_statuses.contains(status)
                        }
                        HttpError::RateLimited { .. } | HttpError::Timeout => true,
                        HttpError::Reqwest(re) => re.is_connect() || re.is_request(),
                        _ => false,
                    };

                    if should_retry && attempt < config.max_retries {
                        let retry_after = match &e {
                            HttpError::RateLimited {
                                retry_after_ms: Some(ms),
                            } => Some(Duration::from_millis(*ms)),
                            _ => None,
                        };
                        // The server's wait is honoured only up to `max_delay`.
                        let delay = match retry_after {
                            Some(wait) if wait > config.max_delay => {
                                tracing::debug!(
                                    retry_after_ms = wait.as_millis() as u64,
                                    max_delay_ms = config.max_delay.as_millis() as u64,
                                    path = url.path(),
                                    "retry-after exceeds max delay, not retrying"
                                );
                                return Err(e);
                            }
                            Some(wait) => wait,
                            None => config.delay_for_attempt(attempt),
                        };
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            path = url.path(),
                            "retrying request"
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned>(
        &self,
        method: &reqwest::Method,
        url: &Url,
        body: Option<&str>,
    ) -> Result<T, HttpError> {
        let host = host_header(url);
        let content_type = body.map(|_| JSON_CONTENT_TYPE);

        // Signed per attempt so every retry gets a fresh nonce.
        let authorization = self.signer.read().await.sign(&RequestParts {
            method: method.as_str(),
            host: &host,
            path: url.path(),
            query: url.query(),
            content_type,
            body,
        })?;

        let mut req = self
            .client
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, authorization);

        if let Some(b) = body {
            req = req
                .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(b.to_string());
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Reqwest(e)
            }
        })?;
        let status = resp.status();

        if status.is_success() {
            let parsed = resp.json::<T>().await?;
            return Ok(parsed);
        }

        let status_code = status.as_u16();
        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs.saturating_mul(1000));
        let body_text = resp.text().await.unwrap_or_default();

        match status_code {
            401 | 403 => Err(HttpError::Unauthorized),
            404 => Err(HttpError::NotFound(body_text)),
            429 => Err(HttpError::RateLimited { retry_after_ms }),
            400..=499 => Err(HttpError::BadRequest(body_text)),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}

impl std::fmt::Debug for ProtectHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectHttp")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Host as sent in the `Host` header: with the port only when it is not the default.
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const SECRET_HEX: &str = "000102030405060708090a0b0c0d0e0f";

    fn http(base: &str) -> ProtectHttp {
        ProtectHttp::new(base, RequestSigner::new("key", SECRET_HEX).unwrap()).unwrap()
    }

    #[test]
    fn test_list_query_encoding() {
        let q = ListQuery {
            blockchain: Some("ETH".to_string()),
            network: Some("main net".to_string()),
            limit: Some(10),
            offset: None,
        };
        assert_eq!(
            q.to_query().as_deref(),
            Some("blockchain=ETH&network=main%20net&limit=10")
        );
        assert_eq!(ListQuery::default().to_query(), None);
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let client = http("https://custody.example:8443/protect/");
        let url = client.url("/api/rest/v1/requests/1", Some("a=b"));
        assert_eq!(url.as_str(), "https://custody.example:8443/protect/api/rest/v1/requests/1?a=b");
        assert_eq!(host_header(&url), "custody.example:8443");
        assert_eq!(client.base_url(), "https://custody.example:8443/protect");
    }

    #[test]
    fn test_default_port_not_in_host() {
        let client = http("https://custody.example");
        let url = client.url("/x", None);
        assert_eq!(host_header(&url), "custody.example");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_invalid_base_url() {
        let signer = RequestSigner::new("key", SECRET_HEX).unwrap();
        assert!(matches!(
            ProtectHttp::new("not a url", signer),
            Err(HttpError::InvalidUrl(_))
        ));
    }

    /// Local server answering every request with `response`. Counts connections.
    async fn serve(response: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    if !response.is_empty() {
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    } else {
                        // Never answer.
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                });
            }
        });
        (base, hits)
    }

    #[tokio::test]
    async fn test_huge_retry_after_is_not_waited_for() {
        let (base, hits) = serve(
            "HTTP/1.1 429 Too Many Requests\r\nRetry-After: 99999999999999999\r\n\
             Content-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let client = http(&base);

        let result = tokio::time::timeout(Duration::from_secs(5), client.get_governance_rules())
            .await
            .expect("request must not hang");
        assert!(matches!(
            result,
            Err(HttpError::RateLimited {
                retry_after_ms: Some(u64::MAX)
            })
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_retry_after_is_retried() {
        let (base, hits) = serve(
            "HTTP/1.1 429 Too Many Requests\r\nRetry-After: 0\r\n\
             Content-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let client = http(&base);

        let err = client.get_governance_rules().await.unwrap_err();
        assert!(matches!(err, HttpError::RateLimited { retry_after_ms: Some(0) }));
        assert_eq!(
            hits.load(Ordering::SeqCst),
            RetryConfig::idempotent().max_retries as usize + 1
        );
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let (base, _) = serve("").await;
        let mut client = http(&base);
        client.client = Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let err = client
            .get::<GovernanceRulesResponse>("/api/rest/v1/governance_rules", None, RetryPolicy::None)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Timeout));
    }

    #[tokio::test]
    async fn test_closed_signer_fails_before_send() {
        let client = http("http://127.0.0.1:9");
        client.close().await;
        assert!(client.is_closed().await);
        let err = client.get_governance_rules().await.unwrap_err();
        assert!(matches!(err, HttpError::Signing(_)));
    }
}
