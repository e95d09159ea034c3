//! Multi-step authorization of a verify request against the configuration
//! snapshot.
//!
//! The chain is a pure function of (request, snapshot): no I/O, evaluated in
//! a fixed order, short-circuiting on the first failure with a distinct
//! catalog code per failure point.

use crate::errors::{AppErrorCode, PaymentOptionsError};
use config_cache::types::{ConfigData, Station, StationCreditorInstitution};

/// Aux digit designating the notice-based (NMU) flow, the only one this
/// service serves.
const NMU_AUX_DIGIT: i64 = 3;

const CONFIG_UNAVAILABLE: &str = "Configuration data currently not available";

/// Raw request inputs; all four are required.
#[derive(Clone, Copy, Debug, Default)]
pub struct VerifyRequest<'a> {
    pub id_psp: Option<&'a str>,
    pub id_broker_psp: Option<&'a str>,
    pub fiscal_code: Option<&'a str>,
    pub notice_number: Option<&'a str>,
}

/// Outcome of a successful authorization: the station to call, the
/// association that selected it, and the notice-derived codes.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub station: &'a Station,
    pub association: &'a StationCreditorInstitution,
    pub segregation_code: i64,
}

pub fn authorize<'a>(
    req: &VerifyRequest<'_>,
    config: &'a ConfigData,
) -> Result<Resolved<'a>, PaymentOptionsError> {
    let id_psp = require(req.id_psp, "idPsp")?;
    let id_broker_psp = require(req.id_broker_psp, "idBrokerPsp")?;
    let fiscal_code = require(req.fiscal_code, "fiscalCode")?;
    let notice_number = require(req.notice_number, "noticeNumber")?;

    let aux_digit = parse_aux_digit(notice_number)?;
    if aux_digit != NMU_AUX_DIGIT {
        return Err(PaymentOptionsError::new(
            AppErrorCode::OdpPspNavNotNmu,
            "Notice number contains a nav not valid for the OdP service",
        ));
    }
    let segregation_code = parse_segregation_code(notice_number)?;

    let psps = config
        .psps
        .as_ref()
        .ok_or_else(config_unavailable)?;
    let psp = psps.get(id_psp).ok_or_else(|| {
        PaymentOptionsError::new(
            AppErrorCode::OdpPspSconosciuto,
            format!("PSP with id {id_psp} not found"),
        )
    })?;
    if !psp.enabled {
        return Err(PaymentOptionsError::new(
            AppErrorCode::OdpPspDisabilitato,
            format!("PSP with id {id_psp} disabled"),
        ));
    }

    let brokers = config
        .psp_brokers
        .as_ref()
        .ok_or_else(config_unavailable)?;
    let broker = brokers.get(id_broker_psp).ok_or_else(|| {
        PaymentOptionsError::new(
            AppErrorCode::OdpIntermediarioPspSconosciuto,
            format!("PSP broker with id {id_broker_psp} not found"),
        )
    })?;
    if !broker.enabled {
        return Err(PaymentOptionsError::new(
            AppErrorCode::OdpIntermediarioPspDisabilitato,
            format!("PSP broker with id {id_broker_psp} disabled"),
        ));
    }

    let institutions = config
        .creditor_institutions
        .as_ref()
        .ok_or_else(config_unavailable)?;
    let institution = institutions.get(fiscal_code).ok_or_else(|| {
        PaymentOptionsError::new(
            AppErrorCode::OdpDominioSconosciuto,
            format!("Creditor institution with id {fiscal_code} not found"),
        )
    })?;
    if institution.enabled != Some(true) {
        return Err(PaymentOptionsError::new(
            AppErrorCode::OdpDominioDisabilitato,
            format!("Creditor institution with id {fiscal_code} disabled"),
        ));
    }

    let associations = config
        .creditor_institution_stations
        .as_ref()
        .ok_or_else(config_unavailable)?;
    let association = associations
        .values()
        .find(|assoc| {
            assoc.aux_digit == Some(aux_digit)
                && assoc.creditor_institution_code.as_deref()
                    == Some(institution.creditor_institution_code.as_str())
        })
        .ok_or_else(|| {
            PaymentOptionsError::new(
                AppErrorCode::OdpStazioneIntPaSconosciuta,
                "Station related to the creditor institution not found",
            )
        })?;

    let stations = config
        .stations
        .as_ref()
        .ok_or_else(config_unavailable)?;
    let station = stations.get(&association.station_code).ok_or_else(|| {
        PaymentOptionsError::new(
            AppErrorCode::OdpStazioneIntPaSconosciuta,
            format!(
                "Station not found using station code {}",
                association.station_code
            ),
        )
    })?;
    if station.enabled != Some(true) {
        return Err(PaymentOptionsError::new(
            AppErrorCode::OdpStazioneIntPaDisabilitata,
            format!(
                "Station found using station code {} disabled",
                association.station_code
            ),
        ));
    }
    if !station.verify_payment_option_enabled {
        return Err(PaymentOptionsError::new(
            AppErrorCode::OdpStazioneIntVerificaOdpDisabilitata,
            format!(
                "Station found using station code {} has the OdP verify service disabled. \
                 Use the standard verification flow",
                association.station_code
            ),
        ));
    }

    Ok(Resolved {
        station,
        association,
        segregation_code,
    })
}

fn require<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, PaymentOptionsError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(PaymentOptionsError::new(
            AppErrorCode::OdpSintassi,
            format!("Missing input {name}"),
        )),
    }
}

fn parse_aux_digit(notice_number: &str) -> Result<i64, PaymentOptionsError> {
    notice_number
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map(i64::from)
        .ok_or_else(|| {
            PaymentOptionsError::new(AppErrorCode::OdpSintassi, "Malformed notice number")
        })
}

// Segregation code occupies the two digits after the aux digit; it is
// forwarded to the direct integration as a query parameter.
fn parse_segregation_code(notice_number: &str) -> Result<i64, PaymentOptionsError> {
    notice_number
        .get(1..3)
        .and_then(|digits| digits.parse::<i64>().ok())
        .ok_or_else(|| {
            PaymentOptionsError::new(AppErrorCode::OdpSintassi, "Malformed notice number")
        })
}

fn config_unavailable() -> PaymentOptionsError {
    PaymentOptionsError::new(AppErrorCode::OdpSystemError, CONFIG_UNAVAILABLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{TestConfig, test_request};
    use crate::errors::AppErrorCode;

    #[test]
    fn full_chain_resolves_station() {
        let config = TestConfig::default().build();
        let resolved = authorize(&test_request(), &config).unwrap();
        assert_eq!(resolved.station.station_code, "77777777777_01");
        assert_eq!(resolved.segregation_code, 11);
    }

    #[test]
    fn authorize_is_deterministic() {
        let config = TestConfig::default().build();
        let req = test_request();
        let first = authorize(&req, &config).unwrap().station.station_code.clone();
        let second = authorize(&req, &config).unwrap().station.station_code.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_inputs_are_syntax_errors() {
        let config = TestConfig::default().build();
        for req in [
            VerifyRequest { id_psp: None, ..test_request() },
            VerifyRequest { id_broker_psp: None, ..test_request() },
            VerifyRequest { fiscal_code: None, ..test_request() },
            VerifyRequest { notice_number: None, ..test_request() },
        ] {
            let err = authorize(&req, &config).unwrap_err();
            assert_eq!(err.code, AppErrorCode::OdpSintassi);
        }
    }

    #[test]
    fn non_nmu_aux_digit_is_rejected() {
        let config = TestConfig::default().build();
        let req = VerifyRequest {
            notice_number: Some("111111111111111111"),
            ..test_request()
        };
        let err = authorize(&req, &config).unwrap_err();
        assert_eq!(err.code, AppErrorCode::OdpPspNavNotNmu);
    }

    #[test]
    fn short_notice_number_is_a_syntax_error() {
        let config = TestConfig::default().build();
        let req = VerifyRequest {
            notice_number: Some("3"),
            ..test_request()
        };
        let err = authorize(&req, &config).unwrap_err();
        assert_eq!(err.code, AppErrorCode::OdpSintassi);
    }

    #[test]
    fn unknown_and_disabled_psp_are_distinct() {
        let config = TestConfig::default().build();
        let err = authorize(
            &VerifyRequest { id_psp: Some("nope"), ..test_request() },
            &config,
        )
        .unwrap_err();
        assert_eq!(err.code, AppErrorCode::OdpPspSconosciuto);

        let config = TestConfig::default().psp_enabled(false).build();
        let err = authorize(&test_request(), &config).unwrap_err();
        assert_eq!(err.code, AppErrorCode::OdpPspDisabilitato);
    }

    #[test]
    fn unknown_and_disabled_broker_are_distinct() {
        let config = TestConfig::default().build();
        let err = authorize(
            &VerifyRequest { id_broker_psp: Some("nope"), ..test_request() },
            &config,
        )
        .unwrap_err();
        assert_eq!(err.code, AppErrorCode::OdpIntermediarioPspSconosciuto);

        let config = TestConfig::default().broker_enabled(false).build();
        let err = authorize(&test_request(), &config).unwrap_err();
        assert_eq!(err.code, AppErrorCode::OdpIntermediarioPspDisabilitato);
    }

    #[test]
    fn unknown_and_disabled_institution_are_distinct() {
        let config = TestConfig::default().build();
        let err = authorize(
            &VerifyRequest { fiscal_code: Some("00000000000"), ..test_request() },
            &config,
        )
        .unwrap_err();
        assert_eq!(err.code, AppErrorCode::OdpDominioSconosciuto);

        let config = TestConfig::default().institution_enabled(false).build();
        let err = authorize(&test_request(), &config).unwrap_err();
        assert_eq!(err.code, AppErrorCode::OdpDominioDisabilitato);
    }

    #[test]
    fn missing_association_fails() {
        let mut config = TestConfig::default().build();
        config
            .creditor_institution_stations
            .as_mut()
            .unwrap()
            .clear();
        let err = authorize(&test_request(), &config).unwrap_err();
        assert_eq!(err.code, AppErrorCode::OdpStazioneIntPaSconosciuta);
    }

    #[test]
    fn association_with_wrong_aux_digit_is_skipped() {
        let config = TestConfig::default().association_aux_digit(0).build();
        let err = authorize(&test_request(), &config).unwrap_err();
        assert_eq!(err.code, AppErrorCode::OdpStazioneIntPaSconosciuta);
    }

    #[test]
    fn disabled_station_fails() {
        let config = TestConfig::default().station_enabled(false).build();
        let err = authorize(&test_request(), &config).unwrap_err();
        assert_eq!(err.code, AppErrorCode::OdpStazioneIntPaDisabilitata);
    }

    #[test]
    fn verify_disabled_station_is_not_reported_as_disabled() {
        let config = TestConfig::default().verify_enabled(false).build();
        let err = authorize(&test_request(), &config).unwrap_err();
        assert_eq!(
            err.code,
            AppErrorCode::OdpStazioneIntVerificaOdpDisabilitata
        );
    }

    #[test]
    fn absent_lookup_maps_are_system_errors() {
        let strips: [fn(&mut config_cache::types::ConfigData); 5] = [
            |c| c.psps = None,
            |c| c.psp_brokers = None,
            |c| c.creditor_institutions = None,
            |c| c.creditor_institution_stations = None,
            |c| c.stations = None,
        ];
        for strip in strips {
            let mut config = TestConfig::default().build();
            strip(&mut config);
            let err = authorize(&test_request(), &config).unwrap_err();
            assert_eq!(err.code, AppErrorCode::OdpSystemError);
        }
    }
}
