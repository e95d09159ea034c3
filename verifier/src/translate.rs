//! Translation of downstream creditor-institution responses into the
//! service's own error surface.
//!
//! A downstream error body is only trusted when it names a known PAA code
//! and its declared status matches that code's catalog status; anything
//! else is masked behind the generic sentinel so that malformed or
//! mislabelled downstream errors never leak through as-is.

use crate::errors::{
    AppErrorCode, CreditorInstitutionErrorCode, ErrorResponse, VerifyError,
};
use crate::models::PaymentOptionsResponse;
use http::StatusCode;

const MASKED_MESSAGE: &str = "Unexpected error returned by the creditor institution service";

/// Decodes a downstream response body, translating error statuses per the
/// PAA validation rules.
pub fn translate_response(
    status: StatusCode,
    body: &[u8],
) -> Result<PaymentOptionsResponse, VerifyError> {
    if status.is_success() {
        return serde_json::from_slice(body).map_err(|err| {
            tracing::error!(%err, "unparseable success body from creditor institution");
            masked(status)
        });
    }

    let Ok(error) = serde_json::from_slice::<ErrorResponse>(body) else {
        tracing::error!(%status, "unparseable error body from creditor institution");
        return Err(masked(status));
    };

    Err(VerifyError::CreditorInstitution(validate_error(
        status, error,
    )))
}

/// Passes a structured downstream error through only when its app code is a
/// known PAA code and the declared status matches the catalog; otherwise the
/// message and code are masked, preserving the original status and
/// timestamps.
fn validate_error(status: StatusCode, error: ErrorResponse) -> ErrorResponse {
    let known = error
        .app_error_code
        .as_deref()
        .and_then(CreditorInstitutionErrorCode::from_app_code);

    match known {
        Some(code) if error.http_status_code == code.expected_status().as_u16() => {
            ErrorResponse {
                error_message: Some(format!(
                    "{} {}",
                    code.name(),
                    error.error_message.as_deref().unwrap_or_default()
                )),
                ..error
            }
        }
        _ => {
            tracing::warn!(
                declared_status = error.http_status_code,
                app_code = error.app_error_code.as_deref().unwrap_or("<none>"),
                "masking creditor institution error outside the PAA contract"
            );
            ErrorResponse {
                http_status_code: status.as_u16(),
                http_status_description: status
                    .canonical_reason()
                    .map(str::to_owned)
                    .or(error.http_status_description),
                error_message: Some(MASKED_MESSAGE.to_owned()),
                app_error_code: Some(AppErrorCode::PaSystemError.code().to_owned()),
                ..error
            }
        }
    }
}

fn masked(status: StatusCode) -> VerifyError {
    VerifyError::CreditorInstitution(ErrorResponse {
        http_status_code: status.as_u16(),
        http_status_description: status.canonical_reason().map(str::to_owned),
        error_message: Some(MASKED_MESSAGE.to_owned()),
        app_error_code: Some(AppErrorCode::PaSystemError.code().to_owned()),
        timestamp: None,
        date_time: None,
    })
}
