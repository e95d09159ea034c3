//! Client for the api-config-cache service.

use crate::types::ConfigData;
use async_trait::async_trait;
use reqwest::{StatusCode, Url, header};

/// Key set requested on every refresh. The cache always fetches the full
/// snapshot; partial refreshes are not supported by the consistency model.
pub const CACHE_KEYS: &[&str] = &[
    "stations",
    "creditorInstitutions",
    "psps",
    "creditorInstitutionStations",
    "pspBrokers",
    "creditorInstitutionBrokers",
];

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("could not load config: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("config provider returned status {0}")]
    UnexpectedStatus(StatusCode),
}

/// Source of configuration snapshots. The production implementation talks to
/// the api-config-cache HTTP service; tests substitute in-memory providers.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn fetch(&self, keys: &[&str]) -> Result<ConfigData, ProviderError>;
}

pub struct ApiConfigClient {
    client: reqwest::Client,
    full_url: String,
    subscription_key: Option<String>,
}

impl ApiConfigClient {
    pub fn new(base_url: &str, subscription_key: Option<String>) -> Self {
        let full_url = format!("{}/cache", base_url.trim_end_matches('/'));

        ApiConfigClient {
            client: reqwest::Client::new(),
            full_url,
            subscription_key,
        }
    }
}

#[async_trait]
impl ConfigProvider for ApiConfigClient {
    async fn fetch(&self, keys: &[&str]) -> Result<ConfigData, ProviderError> {
        let mut url = Url::parse(&self.full_url)
            .map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;
        for key in keys {
            url.query_pairs_mut().append_pair("keys", key);
        }

        let mut request = self.client.get(url);
        if let Some(ref key) = self.subscription_key {
            request = request.header(SUBSCRIPTION_KEY_HEADER, key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::UnexpectedStatus(response.status()));
        }

        Ok(response.json::<ConfigData>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, routing::get};
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    async fn spawn_config_server() -> String {
        let app = Router::new().route(
            "/cache",
            get(|Query(params): Query<Vec<(String, String)>>| async move {
                let keys: Vec<String> = params
                    .into_iter()
                    .filter(|(k, _)| k == "keys")
                    .map(|(_, v)| v)
                    .collect();
                assert_eq!(keys.len(), CACHE_KEYS.len());
                Json(serde_json::json!({
                    "version": "7",
                    "stations": {},
                    "psps": {},
                    "pspBrokers": {},
                    "creditorInstitutions": {},
                    "creditorInstitutionStations": {},
                    "creditorInstitutionBrokers": {}
                }))
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn fetches_full_snapshot() {
        let base = spawn_config_server().await;
        let client = ApiConfigClient::new(&base, Some("test-key".into()));

        let data = client.fetch(CACHE_KEYS).await.unwrap();
        assert_eq!(data.version.as_deref(), Some("7"));
        assert_eq!(data.stations, Some(HashMap::new()));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = ApiConfigClient::new(&format!("http://{addr}"), None);
        let err = client.fetch(CACHE_KEYS).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::UnexpectedStatus(StatusCode::NOT_FOUND)
        ));
    }

    #[tokio::test]
    async fn unreachable_provider_is_an_error() {
        let client = ApiConfigClient::new("http://127.0.0.1:1", None);
        assert!(matches!(
            client.fetch(CACHE_KEYS).await,
            Err(ProviderError::Reqwest(_))
        ));
    }
}
