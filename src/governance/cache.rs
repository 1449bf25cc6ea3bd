//! TTL cache for the verified rules container, with single-flight refresh.
//!
//! - Validity is measured with [`Instant`], so wall-clock adjustments cannot
//!   extend or shorten an entry's life.
//! - Concurrent misses share one upstream fetch: the first miss spawns the fetch
//!   task and every later caller awaits the same shared result (value or error).
//! - The fetch runs on its own task. A caller that stops waiting does not cancel
//!   it; the entry is still installed for later callers.
//! - A failed fetch leaves the previous state untouched; the next `get()` retries.
//!
//! Requires a Tokio runtime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_lock::Mutex;
use futures_util::future::{BoxFuture, FutureExt, Shared};

use crate::error::{ConfigError, IntegrityError, SdkError};
use crate::governance::VerifiedRulesContainer;

/// Default time-to-live for a verified container (300 000 ms).
pub const DEFAULT_RULES_CACHE_TTL: Duration = Duration::from_millis(300_000);

/// Future returned by the fetch function. It must resolve to an already
/// SuperAdmin-verified container; `None` is treated as a missing container.
pub type RulesFetchFuture = BoxFuture<'static, Result<Option<VerifiedRulesContainer>, SdkError>>;

type RefreshOutput = Result<Arc<VerifiedRulesContainer>, Arc<SdkError>>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshOutput>>;

struct CacheEntry {
    value: Arc<VerifiedRulesContainer>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_valid(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

#[derive(Default)]
struct CacheState {
    entry: Option<CacheEntry>,
    in_flight: Option<SharedRefresh>,
    /// Bumped by `clear()` so a refresh started earlier cannot repopulate.
    generation: u64,
}

/// Cache holding the last successfully verified rules container.
pub struct RulesContainerCache {
    ttl: Duration,
    fetch: Arc<dyn Fn() -> RulesFetchFuture + Send + Sync>,
    state: Arc<Mutex<CacheState>>,
}

impl RulesContainerCache {
    pub fn new<F>(ttl: Duration, fetch: F) -> Result<Self, ConfigError>
    where
        F: Fn() -> RulesFetchFuture + Send + Sync + 'static,
    {
        if ttl.is_zero() {
            return Err(ConfigError::InvalidCacheTtl);
        }
        Ok(Self {
            ttl,
            fetch: Arc::new(fetch),
            state: Arc::new(Mutex::new(CacheState::default())),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached container if still valid, otherwise the result of a (shared) refresh.
    pub async fn get(&self) -> Result<Arc<VerifiedRulesContainer>, SdkError> {
        let refresh = {
            let mut state = self.state.lock().await;
            if let Some(entry) = &state.entry {
                if entry.is_valid(self.ttl) {
                    return Ok(entry.value.clone());
                }
            }
            tracing::debug!("rules container cache miss");
            self.join_or_start(&mut state)
        };
        refresh.await.map_err(SdkError::RulesRefresh)
    }

    /// Fetch regardless of validity. Joins a refresh that is already running.
    pub async fn refresh(&self) -> Result<Arc<VerifiedRulesContainer>, SdkError> {
        let refresh = {
            let mut state = self.state.lock().await;
            self.join_or_start(&mut state)
        };
        refresh.await.map_err(SdkError::RulesRefresh)
    }

    /// Drop the cached container; the next `get()` fetches.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entry = None;
        state.in_flight = None;
        state.generation += 1;
    }

    /// Whether a cached container exists and is within its TTL.
    pub async fn is_valid(&self) -> bool {
        self.state
            .lock()
            .await
            .entry
            .as_ref()
            .map(|e| e.is_valid(self.ttl))
            .unwrap_or(false)
    }

    fn join_or_start(&self, state: &mut CacheState) -> SharedRefresh {
        if let Some(in_flight) = &state.in_flight {
            return in_flight.clone();
        }

        let generation = state.generation;
        let fetch = (self.fetch)();
        let shared_state = Arc::clone(&self.state);

        let task = tokio::spawn(async move {
            let result: RefreshOutput = match fetch.await {
                Ok(Some(container)) => Ok(Arc::new(container)),
                Ok(None) => Err(Arc::new(IntegrityError::RulesContainerMissing.into())),
                Err(e) => Err(Arc::new(e)),
            };

            let mut state = shared_state.lock().await;
            if state.generation == generation {
                state.in_flight = None;
                match &result {
                    Ok(value) => {
                        tracing::info!(
                            valid_signatures = value.valid_signatures(),
                            "verified rules container cached"
                        );
                        state.entry = Some(CacheEntry {
                            value: Arc::clone(value),
                            fetched_at: Instant::now(),
                        });
                    }
                    Err(e) => tracing::warn!(error = %e, "rules container refresh failed"),
                }
            }
            result
        });

        let shared = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(Arc::new(SdkError::Other(format!(
                    "rules refresh task failed: {e}"
                )))),
            }
        }
        .boxed()
        .shared();

        state.in_flight = Some(shared.clone());
        shared
    }
}

impl std::fmt::Debug for RulesContainerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulesContainerCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
