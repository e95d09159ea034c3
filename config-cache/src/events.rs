//! Cache-invalidation notification handling.
//!
//! Notifications arrive at-least-once and out of order; the version guards
//! in [`crate::cache::ConfigCache`] make reprocessing harmless. A malformed
//! payload is logged and dropped, never surfaced to the transport.

use crate::cache::{ConfigCache, RefreshOutcome};
use crate::metrics_defs;
use metrics::counter;
use serde::Deserialize;

/// Notification emitted when the upstream configuration changed.
///
/// `cache_version` identifies the snapshot generation, `version` the
/// monotonic token within it. `timestamp` is informational only.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheUpdateEvent {
    pub cache_version: Option<String>,
    pub version: Option<String>,
    pub timestamp: Option<String>,
}

/// Entry point for the notification transport. Best-effort by contract:
/// whatever happens, the caller sees no error.
pub async fn handle_update(cache: &ConfigCache, payload: &[u8]) -> RefreshOutcome {
    let event: CacheUpdateEvent = match serde_json::from_slice(payload) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring malformed cache update event");
            counter!(metrics_defs::UPDATE_EVENT_MALFORMED).increment(1);
            return RefreshOutcome::Skipped;
        }
    };

    tracing::debug!(
        version = event.version.as_deref(),
        cache_version = event.cache_version.as_deref(),
        timestamp = event.timestamp.as_deref(),
        "received cache update event"
    );
    cache.on_update_event(&event).await
}
