//! Error taxonomies for the verify flow.
//!
//! Two parallel catalogs: the application-facing codes surfaced to callers,
//! and the downstream-facing set a creditor institution is permitted to
//! report. Both are data tables (code, status, message) consulted by key so
//! the chain and translator logic stays free of per-case branching.

use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Application-facing error codes, one per failure point of the validation
/// chain and router.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppErrorCode {
    OdpSintassi,
    OdpSemantica,
    OdpPspNavNotNmu,
    OdpPspSconosciuto,
    OdpPspDisabilitato,
    OdpIntermediarioPspSconosciuto,
    OdpIntermediarioPspDisabilitato,
    OdpDominioSconosciuto,
    OdpDominioDisabilitato,
    OdpStazioneIntPaSconosciuta,
    OdpStazioneIntPaDisabilitata,
    OdpStazioneIntVerificaOdpDisabilitata,
    OdpStazioneIntPaIrraggiungibile,
    OdpSystemError,
    PaSystemError,
}

struct CatalogEntry {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
}

impl AppErrorCode {
    const fn entry(self) -> CatalogEntry {
        use AppErrorCode::*;
        match self {
            OdpSintassi => CatalogEntry {
                status: StatusCode::BAD_REQUEST,
                code: "ODP_SINTASSI",
                message: "Bad request error on input syntax",
            },
            OdpSemantica => CatalogEntry {
                status: StatusCode::BAD_REQUEST,
                code: "ODP_SEMANTICA",
                message: "Bad request error due to semantic error within the verify flow",
            },
            OdpPspNavNotNmu => CatalogEntry {
                status: StatusCode::BAD_REQUEST,
                code: "ODP_PSP_NAV_NOT_NMU",
                message: "Notice number contains a nav not valid for the OdP service",
            },
            OdpPspSconosciuto => CatalogEntry {
                status: StatusCode::NOT_FOUND,
                code: "ODP_PSP_SCONOSCIUTO",
                message: "Unknown PSP",
            },
            OdpPspDisabilitato => CatalogEntry {
                status: StatusCode::BAD_REQUEST,
                code: "ODP_PSP_DISABILITATO",
                message: "PSP disabled",
            },
            OdpIntermediarioPspSconosciuto => CatalogEntry {
                status: StatusCode::NOT_FOUND,
                code: "ODP_INTERMEDIARIO_PSP_SCONOSCIUTO",
                message: "Unknown PSP broker",
            },
            OdpIntermediarioPspDisabilitato => CatalogEntry {
                status: StatusCode::BAD_REQUEST,
                code: "ODP_INTERMEDIARIO_PSP_DISABILITATO",
                message: "PSP broker disabled",
            },
            OdpDominioSconosciuto => CatalogEntry {
                status: StatusCode::NOT_FOUND,
                code: "ODP_DOMINIO_SCONOSCIUTO",
                message: "Unknown creditor institution",
            },
            OdpDominioDisabilitato => CatalogEntry {
                status: StatusCode::BAD_REQUEST,
                code: "ODP_DOMINIO_DISABILITATO",
                message: "Creditor institution disabled",
            },
            OdpStazioneIntPaSconosciuta => CatalogEntry {
                status: StatusCode::NOT_FOUND,
                code: "ODP_STAZIONE_INT_PA_SCONOSCIUTA",
                message: "Unknown station",
            },
            OdpStazioneIntPaDisabilitata => CatalogEntry {
                status: StatusCode::BAD_REQUEST,
                code: "ODP_STAZIONE_INT_PA_DISABILITATA",
                message: "Station disabled",
            },
            OdpStazioneIntVerificaOdpDisabilitata => CatalogEntry {
                status: StatusCode::BAD_REQUEST,
                code: "ODP_STAZIONE_INT_VERIFICA_ODP_DISABILITATA",
                message: "Station has the OdP verify service disabled",
            },
            OdpStazioneIntPaIrraggiungibile => CatalogEntry {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "ODP_STAZIONE_INT_PA_IRRAGGIUNGIBILE",
                message: "Required station is currently unavailable through the provided config params",
            },
            OdpSystemError => CatalogEntry {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "ODP_SYSTEM_ERROR",
                message: "Unexpected system error",
            },
            PaSystemError => CatalogEntry {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "PA_SYSTEM_ERROR",
                message: "Unexpected error on EC system call",
            },
        }
    }

    pub const fn status(self) -> StatusCode {
        self.entry().status
    }

    pub const fn code(self) -> &'static str {
        self.entry().code
    }

    pub const fn default_message(self) -> &'static str {
        self.entry().message
    }
}

/// Fixed set of error codes a creditor institution partner may legitimately
/// report ("PAA codes"). Anything outside this table, or reported with a
/// status the code does not expect, is masked before reaching the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreditorInstitutionErrorCode {
    PaaSintassi,
    PaaSemantica,
    PaaSystemError,
    PaaIdDominioErrato,
    PaaIdIntermediarioErrato,
    PaaStazioneIntErrata,
    PaaPagamentoSconosciuto,
    PaaPagamentoDuplicato,
    PaaPagamentoInCorso,
    PaaPagamentoScaduto,
    PaaPagamentoAnnullato,
}

impl CreditorInstitutionErrorCode {
    const ALL: [CreditorInstitutionErrorCode; 11] = [
        Self::PaaSintassi,
        Self::PaaSemantica,
        Self::PaaSystemError,
        Self::PaaIdDominioErrato,
        Self::PaaIdIntermediarioErrato,
        Self::PaaStazioneIntErrata,
        Self::PaaPagamentoSconosciuto,
        Self::PaaPagamentoDuplicato,
        Self::PaaPagamentoInCorso,
        Self::PaaPagamentoScaduto,
        Self::PaaPagamentoAnnullato,
    ];

    const fn table(self) -> (&'static str, &'static str, StatusCode) {
        use CreditorInstitutionErrorCode::*;
        match self {
            PaaSintassi => ("PAA_SINTASSI", "ODP-101", StatusCode::BAD_REQUEST),
            PaaSemantica => ("PAA_SEMANTICA", "ODP-102", StatusCode::UNPROCESSABLE_ENTITY),
            PaaSystemError => ("PAA_SYSTEM_ERROR", "ODP-103", StatusCode::INTERNAL_SERVER_ERROR),
            PaaIdDominioErrato => ("PAA_ID_DOMINIO_ERRATO", "ODP-104", StatusCode::BAD_REQUEST),
            PaaIdIntermediarioErrato => {
                ("PAA_ID_INTERMEDIARIO_ERRATO", "ODP-105", StatusCode::BAD_REQUEST)
            }
            PaaStazioneIntErrata => {
                ("PAA_STAZIONE_INT_ERRATA", "ODP-106", StatusCode::BAD_REQUEST)
            }
            PaaPagamentoSconosciuto => {
                ("PAA_PAGAMENTO_SCONOSCIUTO", "ODP-107", StatusCode::NOT_FOUND)
            }
            PaaPagamentoDuplicato => {
                ("PAA_PAGAMENTO_DUPLICATO", "ODP-108", StatusCode::CONFLICT)
            }
            PaaPagamentoInCorso => ("PAA_PAGAMENTO_IN_CORSO", "ODP-109", StatusCode::CONFLICT),
            PaaPagamentoScaduto => {
                ("PAA_PAGAMENTO_SCADUTO", "ODP-110", StatusCode::UNPROCESSABLE_ENTITY)
            }
            PaaPagamentoAnnullato => {
                ("PAA_PAGAMENTO_ANNULLATO", "ODP-111", StatusCode::UNPROCESSABLE_ENTITY)
            }
        }
    }

    pub const fn name(self) -> &'static str {
        self.table().0
    }

    pub const fn app_code(self) -> &'static str {
        self.table().1
    }

    pub const fn expected_status(self) -> StatusCode {
        self.table().2
    }

    pub fn from_app_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.app_code() == code)
    }
}

/// Structured error object surfaced to callers and exchanged with the
/// downstream partners. Wire format is camelCase JSON.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorResponse {
    pub http_status_code: u16,
    pub http_status_description: Option<String>,
    pub error_message: Option<String>,
    pub app_error_code: Option<String>,
    pub timestamp: Option<i64>,
    pub date_time: Option<String>,
}

/// Failure of the validation chain or router, keyed into the application
/// catalog with a request-specific message.
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("{message}")]
pub struct PaymentOptionsError {
    pub code: AppErrorCode,
    pub message: String,
}

impl PaymentOptionsError {
    pub fn new(code: AppErrorCode, message: impl Into<String>) -> Self {
        PaymentOptionsError {
            code,
            message: message.into(),
        }
    }
}

/// Top-level error of one verify attempt.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum VerifyError {
    #[error(transparent)]
    Options(#[from] PaymentOptionsError),

    /// A managed, already-validated error reported by the downstream
    /// partner; surfaced to the caller as-is.
    #[error("creditor institution reported a managed error")]
    CreditorInstitution(ErrorResponse),
}

impl VerifyError {
    /// HTTP status the caller should receive.
    pub fn status(&self) -> StatusCode {
        match self {
            VerifyError::Options(err) => err.code.status(),
            VerifyError::CreditorInstitution(response) => {
                StatusCode::from_u16(response.http_status_code)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Application error code string carried by the response.
    pub fn app_code(&self) -> &str {
        match self {
            VerifyError::Options(err) => err.code.code(),
            VerifyError::CreditorInstitution(response) => {
                response.app_error_code.as_deref().unwrap_or("ODP-103")
            }
        }
    }

    /// Builds the public structured error for this failure.
    pub fn to_error_response(&self, now: DateTime<Utc>) -> ErrorResponse {
        match self {
            VerifyError::Options(err) => {
                let status = err.code.status();
                ErrorResponse {
                    http_status_code: status.as_u16(),
                    http_status_description: status
                        .canonical_reason()
                        .map(str::to_string),
                    error_message: Some(err.message.clone()),
                    app_error_code: Some(err.code.code().to_string()),
                    timestamp: Some(now.timestamp()),
                    date_time: Some(format_date_time(now)),
                }
            }
            // Downstream-issued errors already carry status and timestamps.
            VerifyError::CreditorInstitution(response) => response.clone(),
        }
    }
}

/// ISO-8601 timestamp string carried next to the unix-seconds timestamp.
pub fn format_date_time(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
