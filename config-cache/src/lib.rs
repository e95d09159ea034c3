//! Local cache of the payment-options configuration snapshot.
//!
//! The cache holds the full configuration document (PSPs, brokers, creditor
//! institutions, stations and their associations) fetched from the
//! api-config-cache service, refreshes it when update notifications arrive,
//! and guarantees readers a consistent, immutable snapshot per request.

pub mod cache;
pub mod events;
mod metrics_defs;
pub mod provider;
pub mod types;

pub use cache::{CacheError, ConfigCache, RefreshOutcome};
pub use events::{CacheUpdateEvent, handle_update};
pub use provider::{ApiConfigClient, CACHE_KEYS, ConfigProvider, ProviderError};
pub use types::ConfigData;
