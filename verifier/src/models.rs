//! Wire models exchanged with the downstream verification services.

use serde::{Deserialize, Serialize};

/// Body sent to the legacy forwarder hop. The real target is addressed via
/// the `X-Host-*` headers; the body identifies the requesting PSP.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentOptionsRequest {
    #[serde(rename = "idPSP", skip_serializing_if = "Option::is_none")]
    pub id_psp: Option<String>,
    #[serde(rename = "idBrokerPSP", skip_serializing_if = "Option::is_none")]
    pub id_broker_psp: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOptionStatus {
    PoUnpaid,
    PoPaid,
    PoPartiallyPaid,
    PoExpiredNotPayable,
    PoExpiredUnpaid,
    PoInvalid,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    PoiUnpaid,
    PoiPaid,
    PoiExpiredNotPayable,
    PoiExpiredUnpaid,
    PoiInvalid,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Installment {
    pub nav: Option<String>,
    pub iuv: Option<String>,
    pub amount: Option<i64>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub valid_from: Option<String>,
    pub status: Option<InstallmentStatus>,
    pub status_reason: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentOption {
    pub description: Option<String>,
    pub number_of_installments: Option<i32>,
    pub amount: Option<i64>,
    pub due_date: Option<String>,
    pub valid_from: Option<String>,
    pub status: Option<PaymentOptionStatus>,
    pub status_reason: Option<String>,
    #[serde(rename = "allCCP")]
    pub all_ccp: Option<bool>,
    pub installments: Option<Vec<Installment>>,
}

/// Successful verify response, passed through to the caller unchanged.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentOptionsResponse {
    pub organization_fiscal_code: Option<String>,
    pub company_name: Option<String>,
    pub office_name: Option<String>,
    pub standin: Option<bool>,
    pub payment_options: Option<Vec<PaymentOption>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_round_trip() {
        let raw = r#"{
            "organizationFiscalCode": "77777777777",
            "companyName": "EC",
            "standin": true,
            "paymentOptions": [{
                "description": "single option",
                "numberOfInstallments": 1,
                "amount": 120,
                "status": "PO_UNPAID",
                "allCCP": true,
                "installments": [{
                    "nav": "311111111111111111",
                    "iuv": "11111111111111111",
                    "amount": 120,
                    "status": "POI_UNPAID"
                }]
            }]
        }"#;

        let parsed: PaymentOptionsResponse = serde_json::from_str(raw).unwrap();
        let options = parsed.payment_options.as_ref().unwrap();
        assert_eq!(options[0].status, Some(PaymentOptionStatus::PoUnpaid));
        assert_eq!(
            options[0].installments.as_ref().unwrap()[0].status,
            Some(InstallmentStatus::PoiUnpaid)
        );
        assert_eq!(options[0].all_ccp, Some(true));
    }

    #[test]
    fn request_serializes_psp_ids() {
        let request = PaymentOptionsRequest {
            id_psp: Some("00001".into()),
            id_broker_psp: Some("00002".into()),
        };
        let raw = serde_json::to_string(&request).unwrap();
        assert!(raw.contains(r#""idPSP":"00001""#));
        assert!(raw.contains(r#""idBrokerPSP":"00002""#));
    }
}
