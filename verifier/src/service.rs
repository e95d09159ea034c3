//! Orchestration of one verify attempt: snapshot, authorization chain,
//! path resolution, downstream call, audit.

use crate::client::CreditorInstitutionClient;
use crate::errors::{AppErrorCode, PaymentOptionsError, VerifyError};
use crate::events::{
    CreditorInfo, DebtorPositionInfo, EventSink, PspInfo, VerifyKoEvent,
};
use crate::metrics_defs;
use crate::models::{PaymentOptionsRequest, PaymentOptionsResponse};
use crate::routing::{self, IntegrationPath, RouterConfig};
use crate::validation::{self, VerifyRequest};
use chrono::Utc;
use config_cache::ConfigCache;
use metrics::counter;
use std::sync::Arc;

pub struct PaymentOptionsService {
    cache: ConfigCache,
    client: CreditorInstitutionClient,
    router: RouterConfig,
    sink: Arc<dyn EventSink>,
}

impl PaymentOptionsService {
    pub fn new(
        cache: ConfigCache,
        client: CreditorInstitutionClient,
        router: RouterConfig,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        PaymentOptionsService {
            cache,
            client,
            router,
            sink,
        }
    }

    /// Serves one verify request end to end. Every failure is audited with
    /// whatever entity ids the chain had resolved before failing, then
    /// propagated.
    pub async fn verify(
        &self,
        req: &VerifyRequest<'_>,
        session_id: &str,
    ) -> Result<PaymentOptionsResponse, VerifyError> {
        match self.verify_inner(req, session_id).await {
            Ok(response) => {
                counter!(metrics_defs::VERIFY_OK).increment(1);
                Ok(response)
            }
            Err((error, creditor)) => {
                counter!(metrics_defs::VERIFY_KO, "code" => error.app_code().to_owned())
                    .increment(1);
                self.audit(req, &error, creditor);
                Err(error)
            }
        }
    }

    async fn verify_inner(
        &self,
        req: &VerifyRequest<'_>,
        session_id: &str,
    ) -> Result<PaymentOptionsResponse, (VerifyError, CreditorInfo)> {
        let mut creditor = CreditorInfo {
            id_pa: req.fiscal_code.map(str::to_owned),
            ..Default::default()
        };

        let snapshot = self.cache.snapshot().await.map_err(|err| {
            tracing::error!(%err, session_id, "configuration snapshot unavailable");
            (
                VerifyError::Options(PaymentOptionsError::new(
                    AppErrorCode::OdpSystemError,
                    "Configuration data currently not available",
                )),
                creditor.clone(),
            )
        })?;

        let resolved = validation::authorize(req, &snapshot)
            .map_err(|err| (VerifyError::Options(err), creditor.clone()))?;
        creditor.id_station = Some(resolved.station.station_code.clone());
        creditor.id_broker_pa = resolved.station.broker_code.clone();

        // fiscal_code and notice_number are guaranteed present past authorize.
        let fiscal_code = req.fiscal_code.unwrap_or_default();
        let notice_number = req.notice_number.unwrap_or_default();

        let path = routing::resolve(resolved.station, fiscal_code, notice_number, &self.router)
            .map_err(|err| (VerifyError::Options(err), creditor.clone()))?;
        tracing::info!(
            session_id,
            station = %resolved.station.station_code,
            direct = matches!(path, IntegrationPath::Direct { .. }),
            "forwarding verify request"
        );

        let request = PaymentOptionsRequest {
            id_psp: req.id_psp.map(str::to_owned),
            id_broker_psp: req.id_broker_psp.map(str::to_owned),
        };
        let segregation_codes = format!("{:02}", resolved.segregation_code);

        self.client
            .verify(
                &path,
                fiscal_code,
                notice_number,
                &request,
                Some(&segregation_codes),
            )
            .await
            .map_err(|err| (err, creditor.clone()))
    }

    /// Fire-and-forget audit emission; sink failures never reach the caller.
    fn audit(&self, req: &VerifyRequest<'_>, error: &VerifyError, creditor: CreditorInfo) {
        let event = VerifyKoEvent::from_error(
            error,
            PspInfo {
                id_psp: req.id_psp.map(str::to_owned),
                id_broker_psp: req.id_broker_psp.map(str::to_owned),
            },
            DebtorPositionInfo {
                notice_number: req.notice_number.map(str::to_owned),
            },
            creditor,
            Utc::now(),
        );
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(err) = sink.emit(&event).await {
                counter!(metrics_defs::KO_EVENT_EMIT_FAILED).increment(1);
                tracing::warn!(%err, event_id = %event.id, "failed to emit verify KO event");
            }
        });
    }
}
