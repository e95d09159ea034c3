//! Per-station integration path resolution.
//!
//! A station is served by exactly one of two paths: a direct call to the
//! debt-position core, or the legacy hop through the creditor-institution
//! forwarder. The choice is made here, once, from the snapshot data; the
//! chosen path never falls back to the other on failure.

use crate::errors::{AppErrorCode, PaymentOptionsError};
use config_cache::types::{Protocol, Station};

const VERIFY_PATH_SUFFIX: &str = "/payment-options/organizations";

/// Deployment parameters consulted during resolution.
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Trusted forwarder endpoint; a station's connection ip must be part of
    /// it to be routed through the forwarder.
    pub forwarder_endpoint: String,
    /// Path appended to the forwarder base built from the station connection.
    pub forwarder_path: String,
    /// Base URL of the debt-position core, when direct integration is on.
    pub direct_endpoint: Option<String>,
}

/// Target of a forwarder hop: the forwarder's own base plus the headers
/// describing where it should relay the call.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardTarget {
    pub forwarder_url: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub proxy: Option<(String, u16)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum IntegrationPath {
    Direct { endpoint: String },
    Forward(ForwardTarget),
}

pub fn resolve(
    station: &Station,
    fiscal_code: &str,
    notice_number: &str,
    config: &RouterConfig,
) -> Result<IntegrationPath, PaymentOptionsError> {
    if let Some(endpoint) = direct_endpoint(station, config) {
        tracing::info!(
            station = %station.station_code,
            "using direct debt-position endpoint"
        );
        return Ok(IntegrationPath::Direct { endpoint });
    }

    let connection = station.connection.as_ref();
    let ip = connection.and_then(|c| c.ip.as_deref());
    if !ip.is_some_and(|ip| config.forwarder_endpoint.contains(ip)) {
        return Err(PaymentOptionsError::new(
            AppErrorCode::OdpStazioneIntPaIrraggiungibile,
            "Station not configured to pass through the forwarder",
        ));
    }

    let rest_endpoint = station.rest_endpoint.as_deref().ok_or_else(|| {
        PaymentOptionsError::new(
            AppErrorCode::OdpSemantica,
            "Station verify endpoint not provided",
        )
    })?;
    let (host, port, path) = split_target(rest_endpoint, fiscal_code, notice_number)?;

    Ok(IntegrationPath::Forward(ForwardTarget {
        forwarder_url: forwarder_base(station, config),
        host,
        port,
        path,
        proxy: station.proxy.as_ref().and_then(|proxy| {
            Some((proxy.proxy_host.clone()?, proxy.proxy_port?))
        }),
    }))
}

fn direct_endpoint(station: &Station, config: &RouterConfig) -> Option<String> {
    let direct = config.direct_endpoint.as_deref()?;
    let rest = station.rest_endpoint.as_deref()?;
    rest.trim_end_matches('/')
        .eq_ignore_ascii_case(direct.trim_end_matches('/'))
        .then(|| rest.to_owned())
}

/// Splits `scheme://host[:port]/[path]` into at most four `/`-separated
/// segments and derives the relay target from them. The port defaults to 443
/// only when the scheme segment mentions https, otherwise 80.
fn split_target(
    rest_endpoint: &str,
    fiscal_code: &str,
    notice_number: &str,
) -> Result<(String, u16, String), PaymentOptionsError> {
    let malformed =
        || PaymentOptionsError::new(AppErrorCode::OdpSemantica, "Malformed target URL");

    let mut parts = rest_endpoint.splitn(4, '/');
    let scheme = parts.next().ok_or_else(malformed)?;
    parts.next().ok_or_else(malformed)?;
    let authority = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
    let extra_path = parts.next();

    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().map_err(|_| malformed())?),
        None => (authority, if scheme.contains("https") { 443 } else { 80 }),
    };

    let suffix = format!(
        "{VERIFY_PATH_SUFFIX}/{fiscal_code}/notices/{notice_number}"
    );
    let path = match extra_path {
        Some(extra) => format!("{extra}{suffix}"),
        None => suffix,
    };

    Ok((host.to_owned(), port, path))
}

fn forwarder_base(station: &Station, config: &RouterConfig) -> String {
    let connection = station.connection.as_ref();
    let scheme = match connection.and_then(|c| c.protocol) {
        Some(Protocol::Https) => "https",
        _ => "http",
    };
    let ip = connection
        .and_then(|c| c.ip.as_deref())
        .unwrap_or_default();
    let port = connection.and_then(|c| c.port).unwrap_or(80);
    format!("{scheme}://{ip}:{port}{}", config.forwarder_path)
}
