//! HTTP surface of the gateway: the verify endpoint, the cache-update
//! notification intake, and the info probe.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use config_cache::ConfigCache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use verifier::{PaymentOptionsService, VerifyRequest};

const SESSION_ID_HEADER: &str = "X-Session-Id";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PaymentOptionsService>,
    pub cache: ConfigCache,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/payment-options/organizations/{fiscal_code}/notices/{notice_number}",
            get(verify_payment_options),
        )
        .route("/cache/update", post(cache_update))
        .route("/info", get(info))
        .with_state(state)
}

#[derive(Deserialize, Debug)]
struct VerifyParams {
    #[serde(rename = "idPsp")]
    id_psp: Option<String>,
    #[serde(rename = "idBrokerPsp")]
    id_broker_psp: Option<String>,
}

async fn verify_payment_options(
    State(state): State<AppState>,
    Path((fiscal_code, notice_number)): Path<(String, String)>,
    Query(params): Query<VerifyParams>,
    headers: HeaderMap,
) -> Response {
    let session_id = headers
        .get(SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let request = VerifyRequest {
        id_psp: params.id_psp.as_deref(),
        id_broker_psp: params.id_broker_psp.as_deref(),
        fiscal_code: Some(&fiscal_code),
        notice_number: Some(&notice_number),
    };

    match state.service.verify(&request, &session_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => {
            let body = error.to_error_response(Utc::now());
            (error.status(), Json(body)).into_response()
        }
    }
}

// Notification intake; malformed payloads are ignored inside handle_update,
// the sender always gets a 200.
async fn cache_update(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let outcome = config_cache::handle_update(&state.cache, &body).await;
    tracing::debug!(?outcome, "cache update notification processed");
    StatusCode::OK
}

#[derive(Serialize)]
struct InfoResponse {
    name: &'static str,
    version: &'static str,
}

async fn info() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
