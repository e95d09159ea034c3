//! Metric names emitted by the configuration cache.

pub const REFRESH_APPLIED: &str = "config_cache.refresh.applied";
pub const REFRESH_REJECTED_STALE: &str = "config_cache.refresh.rejected_stale";
pub const REFRESH_SKIPPED: &str = "config_cache.refresh.skipped";
pub const REFRESH_FAILED: &str = "config_cache.refresh.failed";
pub const UPDATE_EVENT_MALFORMED: &str = "config_cache.update_event.malformed";
