//! Verify flow for payment-option lookups: validation chain, integration
//! path routing, downstream client with response translation, and KO audit
//! events.

pub mod client;
pub mod errors;
pub mod events;
mod metrics_defs;
pub mod models;
pub mod routing;
pub mod service;
pub mod translate;
pub mod validation;

#[cfg(test)]
pub(crate) mod testutils;

pub use client::CreditorInstitutionClient;
pub use errors::{AppErrorCode, ErrorResponse, PaymentOptionsError, VerifyError};
pub use events::{EventSink, TracingSink, VerifyKoEvent};
pub use models::{PaymentOptionsRequest, PaymentOptionsResponse};
pub use routing::{IntegrationPath, RouterConfig};
pub use service::PaymentOptionsService;
pub use validation::VerifyRequest;
