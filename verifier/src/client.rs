//! Outbound HTTP client for the creditor-institution side of the verify
//! flow. One method per integration path; both funnel the downstream reply
//! through the translator.

use crate::errors::{AppErrorCode, PaymentOptionsError, VerifyError};
use crate::models::{PaymentOptionsRequest, PaymentOptionsResponse};
use crate::routing::{ForwardTarget, IntegrationPath};
use crate::translate::translate_response;
use std::time::Duration;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const HOST_URL_HEADER: &str = "X-Host-Url";
const HOST_PORT_HEADER: &str = "X-Host-Port";
const HOST_PATH_HEADER: &str = "X-Host-Path";

#[derive(Clone)]
pub struct CreditorInstitutionClient {
    http: reqwest::Client,
    forwarder_subscription_key: Option<String>,
    timeout: Duration,
}

impl CreditorInstitutionClient {
    pub fn new(forwarder_subscription_key: Option<String>, timeout: Duration) -> Self {
        CreditorInstitutionClient {
            http: reqwest::Client::new(),
            forwarder_subscription_key,
            timeout,
        }
    }

    /// Issues the verify call along the resolved path.
    pub async fn verify(
        &self,
        path: &IntegrationPath,
        fiscal_code: &str,
        notice_number: &str,
        request: &PaymentOptionsRequest,
        segregation_codes: Option<&str>,
    ) -> Result<PaymentOptionsResponse, VerifyError> {
        match path {
            IntegrationPath::Direct { endpoint } => {
                self.call_direct(endpoint, fiscal_code, notice_number, segregation_codes)
                    .await
            }
            IntegrationPath::Forward(target) => self.call_forwarder(target, request).await,
        }
    }

    async fn call_direct(
        &self,
        endpoint: &str,
        fiscal_code: &str,
        notice_number: &str,
        segregation_codes: Option<&str>,
    ) -> Result<PaymentOptionsResponse, VerifyError> {
        let url = format!(
            "{}/payment-options/organizations/{fiscal_code}/notices/{notice_number}",
            endpoint.trim_end_matches('/')
        );

        let mut request = self.http.post(&url).timeout(self.timeout);
        if let Some(codes) = segregation_codes {
            request = request.query(&[("segregationCodes", codes)]);
        }

        let response = request.send().await.map_err(unreachable_station)?;
        let status = http::StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.bytes().await.map_err(unreachable_station)?;
        translate_response(status, &body)
    }

    async fn call_forwarder(
        &self,
        target: &ForwardTarget,
        request: &PaymentOptionsRequest,
    ) -> Result<PaymentOptionsResponse, VerifyError> {
        // The station proxy applies per call, so a proxied station gets its
        // own client instead of the shared one.
        let http = match &target.proxy {
            Some((host, port)) => {
                let proxy = reqwest::Proxy::all(format!("http://{host}:{port}"))
                    .map_err(|err| semantic_error(&target.forwarder_url, err))?;
                reqwest::Client::builder()
                    .proxy(proxy)
                    .build()
                    .map_err(|err| semantic_error(&target.forwarder_url, err))?
            }
            None => self.http.clone(),
        };

        let mut builder = http
            .post(&target.forwarder_url)
            .timeout(self.timeout)
            .header(HOST_URL_HEADER, &target.host)
            .header(HOST_PORT_HEADER, target.port)
            .header(HOST_PATH_HEADER, &target.path)
            .json(request);
        if let Some(key) = &self.forwarder_subscription_key {
            builder = builder.header(SUBSCRIPTION_KEY_HEADER, key);
        }

        let response = builder.send().await.map_err(unreachable_station)?;
        let status = http::StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.bytes().await.map_err(unreachable_station)?;
        translate_response(status, &body)
    }
}

fn unreachable_station(err: reqwest::Error) -> VerifyError {
    tracing::error!(%err, "creditor institution call failed");
    VerifyError::Options(PaymentOptionsError::new(
        AppErrorCode::OdpStazioneIntPaIrraggiungibile,
        "Error encountered while calling the station",
    ))
}

fn semantic_error(url: &str, err: impl std::fmt::Display) -> VerifyError {
    tracing::error!(%err, url, "invalid downstream call parameters");
    VerifyError::Options(PaymentOptionsError::new(
        AppErrorCode::OdpSemantica,
        format!("Malformed URL: {url}"),
    ))
}
