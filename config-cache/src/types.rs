//! Snapshot data model for the configuration cache.
//!
//! These types mirror the aggregate document served by the api-config-cache
//! service: a `version` token plus one map per requested key, each keyed by
//! the entity's natural code. A snapshot is never mutated after publication;
//! the cache replaces the whole `Arc<ConfigData>` atomically.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Full configuration snapshot as returned by the provider.
///
/// Every collection is optional: a key the provider was never queried for
/// stays `None`, and consumers must report the configuration as unavailable
/// rather than treating lookups in it as misses.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConfigData {
    pub version: Option<String>,
    pub psps: Option<HashMap<String, PaymentServiceProvider>>,
    #[serde(rename = "pspBrokers")]
    pub psp_brokers: Option<HashMap<String, BrokerPsp>>,
    #[serde(rename = "creditorInstitutions")]
    pub creditor_institutions: Option<HashMap<String, CreditorInstitution>>,
    pub stations: Option<HashMap<String, Station>>,
    #[serde(rename = "creditorInstitutionStations")]
    pub creditor_institution_stations: Option<HashMap<String, StationCreditorInstitution>>,
    #[serde(rename = "creditorInstitutionBrokers")]
    pub creditor_institution_brokers: Option<HashMap<String, BrokerCreditorInstitution>>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Http,
    Https,
}

/// Connection parameters used to reach the legacy forwarder hop.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Connection {
    pub protocol: Option<Protocol>,
    pub ip: Option<String>,
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StationProxy {
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
}

/// Per-creditor-institution channel configuration.
///
/// `rest_endpoint` doubles as the legacy-forward target and, when it matches
/// the configured direct-integration base, as the direct endpoint marker.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Station {
    pub station_code: String,
    pub enabled: Option<bool>,
    pub broker_code: Option<String>,
    pub connection: Option<Connection>,
    pub proxy: Option<StationProxy>,
    pub rest_endpoint: Option<String>,
    pub verify_payment_option_enabled: bool,
}

/// Association between a creditor institution and a station, qualified by
/// aux digit and segregation code.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StationCreditorInstitution {
    pub creditor_institution_code: Option<String>,
    pub station_code: String,
    pub application_code: Option<i64>,
    pub aux_digit: Option<i64>,
    pub segregation_code: Option<i64>,
    pub broadcast: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PaymentServiceProvider {
    pub psp_code: String,
    pub enabled: bool,
    pub description: Option<String>,
    pub business_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BrokerPsp {
    pub broker_psp_code: String,
    pub enabled: bool,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CreditorInstitution {
    pub creditor_institution_code: String,
    pub enabled: Option<bool>,
    pub business_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BrokerCreditorInstitution {
    pub broker_code: Option<String>,
    pub enabled: Option<bool>,
    pub description: Option<String>,
}
