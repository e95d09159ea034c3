//! Shared fixtures for verifier tests: a canonical request and a snapshot
//! builder with per-scenario toggles.

use crate::validation::VerifyRequest;
use config_cache::types::{
    BrokerPsp, ConfigData, Connection, CreditorInstitution, PaymentServiceProvider, Protocol,
    Station, StationCreditorInstitution, StationProxy,
};
use std::collections::HashMap;

pub const PSP_CODE: &str = "AGID_01";
pub const BROKER_CODE: &str = "00001";
pub const FISCAL_CODE: &str = "77777777777";
pub const STATION_CODE: &str = "77777777777_01";
/// Aux digit 3, segregation code 11.
pub const NOTICE_NUMBER: &str = "311111111111111111";

pub fn test_request() -> VerifyRequest<'static> {
    VerifyRequest {
        id_psp: Some(PSP_CODE),
        id_broker_psp: Some(BROKER_CODE),
        fiscal_code: Some(FISCAL_CODE),
        notice_number: Some(NOTICE_NUMBER),
    }
}

pub struct TestConfig {
    psp_enabled: bool,
    broker_enabled: bool,
    institution_enabled: bool,
    station_enabled: bool,
    verify_enabled: bool,
    association_aux_digit: i64,
    rest_endpoint: Option<String>,
    connection: Option<Connection>,
    proxy: Option<StationProxy>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            psp_enabled: true,
            broker_enabled: true,
            institution_enabled: true,
            station_enabled: true,
            verify_enabled: true,
            association_aux_digit: 3,
            rest_endpoint: Some("https://direct.example.org/payment-options/service".into()),
            connection: Some(Connection {
                protocol: Some(Protocol::Https),
                ip: Some("forwarder.example.org".into()),
                port: Some(8443),
            }),
            proxy: None,
        }
    }
}

impl TestConfig {
    pub fn psp_enabled(mut self, enabled: bool) -> Self {
        self.psp_enabled = enabled;
        self
    }

    pub fn broker_enabled(mut self, enabled: bool) -> Self {
        self.broker_enabled = enabled;
        self
    }

    pub fn institution_enabled(mut self, enabled: bool) -> Self {
        self.institution_enabled = enabled;
        self
    }

    pub fn station_enabled(mut self, enabled: bool) -> Self {
        self.station_enabled = enabled;
        self
    }

    pub fn verify_enabled(mut self, enabled: bool) -> Self {
        self.verify_enabled = enabled;
        self
    }

    pub fn association_aux_digit(mut self, aux_digit: i64) -> Self {
        self.association_aux_digit = aux_digit;
        self
    }

    pub fn rest_endpoint(mut self, endpoint: Option<&str>) -> Self {
        self.rest_endpoint = endpoint.map(str::to_owned);
        self
    }

    pub fn connection(mut self, connection: Option<Connection>) -> Self {
        self.connection = connection;
        self
    }

    pub fn proxy(mut self, proxy: Option<StationProxy>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn build(self) -> ConfigData {
        let mut psps = HashMap::new();
        psps.insert(
            PSP_CODE.to_owned(),
            PaymentServiceProvider {
                psp_code: PSP_CODE.to_owned(),
                enabled: self.psp_enabled,
                business_name: Some("PSP Test".into()),
                ..Default::default()
            },
        );

        let mut brokers = HashMap::new();
        brokers.insert(
            BROKER_CODE.to_owned(),
            BrokerPsp {
                broker_psp_code: BROKER_CODE.to_owned(),
                enabled: self.broker_enabled,
                ..Default::default()
            },
        );

        let mut institutions = HashMap::new();
        institutions.insert(
            FISCAL_CODE.to_owned(),
            CreditorInstitution {
                creditor_institution_code: FISCAL_CODE.to_owned(),
                enabled: Some(self.institution_enabled),
                business_name: Some("Comune di Test".into()),
            },
        );

        let mut stations = HashMap::new();
        stations.insert(
            STATION_CODE.to_owned(),
            Station {
                station_code: STATION_CODE.to_owned(),
                enabled: Some(self.station_enabled),
                broker_code: Some("intermediario".into()),
                connection: self.connection,
                proxy: self.proxy,
                rest_endpoint: self.rest_endpoint,
                verify_payment_option_enabled: self.verify_enabled,
            },
        );

        let mut associations = HashMap::new();
        associations.insert(
            STATION_CODE.to_owned(),
            StationCreditorInstitution {
                creditor_institution_code: Some(FISCAL_CODE.to_owned()),
                station_code: STATION_CODE.to_owned(),
                application_code: None,
                aux_digit: Some(self.association_aux_digit),
                segregation_code: Some(11),
                broadcast: Some(false),
            },
        );

        ConfigData {
            version: Some("test".into()),
            psps: Some(psps),
            psp_brokers: Some(brokers),
            creditor_institutions: Some(institutions),
            stations: Some(stations),
            creditor_institution_stations: Some(associations),
            creditor_institution_brokers: Some(HashMap::new()),
        }
    }
}
