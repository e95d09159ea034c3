//! Fire-and-forget audit events for failed verify attempts.

use crate::errors::VerifyError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const SERVICE_IDENTIFIER: &str = "ODP";

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PspInfo {
    pub id_psp: Option<String>,
    pub id_broker_psp: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebtorPositionInfo {
    pub notice_number: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditorInfo {
    #[serde(rename = "idPA")]
    pub id_pa: Option<String>,
    pub id_station: Option<String>,
    #[serde(rename = "idBrokerPA")]
    pub id_broker_pa: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FaultBean {
    pub fault_code: Option<String>,
    pub description: Option<String>,
    pub timestamp: Option<i64>,
    pub date_time: Option<String>,
}

/// Audit record of one failed verify attempt, with whatever entity ids the
/// chain had resolved before failing.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyKoEvent {
    pub id: String,
    pub psp: PspInfo,
    pub debtor_position: DebtorPositionInfo,
    pub creditor: CreditorInfo,
    pub fault_bean: FaultBean,
    pub service_identifier: String,
}

impl VerifyKoEvent {
    pub fn from_error(
        error: &VerifyError,
        psp: PspInfo,
        debtor_position: DebtorPositionInfo,
        creditor: CreditorInfo,
        now: DateTime<Utc>,
    ) -> Self {
        let response = error.to_error_response(now);
        VerifyKoEvent {
            id: Uuid::new_v4().to_string(),
            psp,
            debtor_position,
            creditor,
            fault_bean: FaultBean {
                fault_code: response.app_error_code,
                description: response.error_message,
                timestamp: response.timestamp.or(Some(now.timestamp())),
                date_time: response
                    .date_time
                    .or_else(|| Some(crate::errors::format_date_time(now))),
            },
            service_identifier: SERVICE_IDENTIFIER.to_owned(),
        }
    }
}

/// Destination for audit events. Emission is fire-and-forget: sink failures
/// are logged by the caller and never surfaced to the request path.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: &VerifyKoEvent) -> Result<(), SinkError>;
}

#[derive(thiserror::Error, Debug)]
#[error("event sink failure: {0}")]
pub struct SinkError(pub String);

/// Default sink: structured log line carrying the serialized event.
pub struct TracingSink;

#[async_trait]
impl EventSink for TracingSink {
    async fn emit(&self, event: &VerifyKoEvent) -> Result<(), SinkError> {
        let payload =
            serde_json::to_string(event).map_err(|err| SinkError(err.to_string()))?;
        tracing::info!(target: "verify_ko_events", %payload, "verify KO event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppErrorCode, PaymentOptionsError};

    #[test]
    fn event_carries_fault_details_from_the_error() {
        let error = VerifyError::Options(PaymentOptionsError::new(
            AppErrorCode::OdpDominioSconosciuto,
            "Creditor institution with id x not found",
        ));
        let now = Utc::now();
        let event = VerifyKoEvent::from_error(
            &error,
            PspInfo {
                id_psp: Some("AGID_01".into()),
                id_broker_psp: Some("00001".into()),
            },
            DebtorPositionInfo {
                notice_number: Some("311111111111111111".into()),
            },
            CreditorInfo::default(),
            now,
        );

        assert_eq!(event.service_identifier, "ODP");
        assert_eq!(
            event.fault_bean.fault_code.as_deref(),
            Some("ODP_DOMINIO_SCONOSCIUTO")
        );
        assert_eq!(event.fault_bean.timestamp, Some(now.timestamp()));
        assert!(!event.id.is_empty());
    }

    #[test]
    fn wire_format_is_camel_case() {
        let event = VerifyKoEvent::from_error(
            &VerifyError::Options(PaymentOptionsError::new(
                AppErrorCode::OdpSintassi,
                "Missing input idPsp",
            )),
            PspInfo::default(),
            DebtorPositionInfo::default(),
            CreditorInfo {
                id_pa: Some("77777777777".into()),
                id_station: Some("77777777777_01".into()),
                id_broker_pa: Some("intermediario".into()),
            },
            Utc::now(),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["creditor"]["idPA"], "77777777777");
        assert_eq!(value["faultBean"]["faultCode"], "ODP_SINTASSI");
        assert_eq!(value["serviceIdentifier"], "ODP");
        assert_eq!(value["debtorPosition"]["noticeNumber"], serde_json::Value::Null);
    }
}
