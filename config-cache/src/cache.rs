//! Consistency manager for the local configuration snapshot.
//!
//! The cache owns the current [`ConfigData`] snapshot. Request handlers take
//! one `Arc` reference per request and never observe a mutation: refreshes
//! build a complete replacement document and swap it under a write lock.
//! Refreshes triggered by update events are best-effort; a failure keeps the
//! previous snapshot serving ("last known good"). Only the very first load
//! is allowed to fail loudly, since there is nothing safe to serve yet.

use crate::events::CacheUpdateEvent;
use crate::metrics_defs;
use crate::provider::{CACHE_KEYS, ConfigProvider, ProviderError};
use crate::types::ConfigData;
use metrics::counter;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("configuration data currently not available")]
    Unavailable,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Result of one refresh attempt. Only `Failed` is ever logged-and-discarded;
/// the other variants keep the "why nothing changed" distinction observable.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// A new snapshot was published.
    Applied { version: Option<String> },
    /// The fetch returned a snapshot older than the one already applied.
    Rejected {
        fetched: Option<String>,
        current: Option<String>,
    },
    /// The current state already satisfies the event; no fetch was made.
    Skipped,
    /// The provider call failed; the previous snapshot (if any) is retained.
    Failed(ProviderError),
}

#[derive(Default)]
struct CacheState {
    data: Option<Arc<ConfigData>>,
    version: Option<String>,
    cache_version: Option<String>,
}

struct CacheInner {
    provider: Arc<dyn ConfigProvider>,
    state: RwLock<CacheState>,
    // Single-flight guard: at most one fetch in flight. Waiters re-check the
    // state once they hold the lock and converge instead of refetching.
    refresh_lock: Mutex<()>,
}

#[derive(Clone)]
pub struct ConfigCache {
    inner: Arc<CacheInner>,
}

impl ConfigCache {
    pub fn new(provider: Arc<dyn ConfigProvider>) -> Self {
        ConfigCache {
            inner: Arc::new(CacheInner {
                provider,
                state: RwLock::new(CacheState::default()),
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    /// Current snapshot, loading it inline if the cache is still empty.
    ///
    /// The returned `Arc` stays consistent for the caller regardless of
    /// concurrent refreshes; callers must not re-read mid-request.
    pub async fn snapshot(&self) -> Result<Arc<ConfigData>, CacheError> {
        if let Some(data) = self.inner.state.read().data.clone() {
            return Ok(data);
        }

        // First load: a failure here must propagate, there is no fallback.
        match self.refresh(None).await {
            RefreshOutcome::Failed(err) => Err(err.into()),
            _ => self
                .inner
                .state
                .read()
                .data
                .clone()
                .ok_or(CacheError::Unavailable),
        }
    }

    /// Applied version of the current snapshot, if any. Mostly useful for
    /// diagnostics endpoints and tests.
    pub fn current_version(&self) -> Option<String> {
        self.inner.state.read().version.clone()
    }

    /// Handles a cache-invalidation notification. Never returns an error:
    /// a failed refresh is logged and the previous snapshot keeps serving.
    pub async fn on_update_event(&self, event: &CacheUpdateEvent) -> RefreshOutcome {
        if !self.needs_refresh(event) {
            tracing::debug!(
                version = event.version.as_deref(),
                cache_version = event.cache_version.as_deref(),
                "update event does not supersede the applied snapshot"
            );
            counter!(metrics_defs::REFRESH_SKIPPED).increment(1);
            return RefreshOutcome::Skipped;
        }

        let outcome = self.refresh(Some(event)).await;
        if let RefreshOutcome::Failed(ref err) = outcome {
            tracing::error!(
                error = %err,
                "cache refresh failed; keeping the previous snapshot"
            );
        }
        outcome
    }

    fn needs_refresh(&self, event: &CacheUpdateEvent) -> bool {
        let state = self.inner.state.read();
        state.data.is_none()
            || state.version.is_none()
            || state.cache_version.is_none()
            || event.cache_version != state.cache_version
            || version_supersedes(event.version.as_deref(), state.version.as_deref())
    }

    async fn refresh(&self, event: Option<&CacheUpdateEvent>) -> RefreshOutcome {
        let _guard = self.inner.refresh_lock.lock().await;

        // A concurrent first-load caller may have won the race while we
        // waited for the lock; converge on its snapshot.
        if event.is_none() && self.inner.state.read().data.is_some() {
            counter!(metrics_defs::REFRESH_SKIPPED).increment(1);
            return RefreshOutcome::Skipped;
        }

        let fetched = match self.inner.provider.fetch(CACHE_KEYS).await {
            Ok(data) => data,
            Err(err) => {
                counter!(metrics_defs::REFRESH_FAILED).increment(1);
                return RefreshOutcome::Failed(err);
            }
        };

        let mut state = self.inner.state.write();

        // A fetch finishing late must not clobber a newer snapshot; the
        // version guard, not completion order, decides the winner.
        if fetch_is_stale(fetched.version.as_deref(), state.version.as_deref()) {
            let outcome = RefreshOutcome::Rejected {
                fetched: fetched.version.clone(),
                current: state.version.clone(),
            };
            tracing::warn!(
                fetched = fetched.version.as_deref(),
                current = state.version.as_deref(),
                "discarding stale snapshot fetch"
            );
            counter!(metrics_defs::REFRESH_REJECTED_STALE).increment(1);
            return outcome;
        }

        if fetched.version.is_some() {
            state.version = fetched.version.clone();
        }
        state.cache_version = event.and_then(|e| e.cache_version.clone());
        let version = state.version.clone();
        state.data = Some(Arc::new(fetched));

        tracing::info!(version = version.as_deref(), "configuration snapshot applied");
        counter!(metrics_defs::REFRESH_APPLIED).increment(1);
        RefreshOutcome::Applied { version }
    }
}

/// Plain string ordering, deliberately not numeric: the upstream versioning
/// scheme compares version tokens lexicographically ("10" < "9").
fn version_supersedes(event: Option<&str>, current: Option<&str>) -> bool {
    match (event, current) {
        (Some(event), Some(current)) => event > current,
        _ => true,
    }
}

fn fetch_is_stale(fetched: Option<&str>, current: Option<&str>) -> bool {
    matches!((fetched, current), (Some(fetched), Some(current)) if fetched < current)
}
