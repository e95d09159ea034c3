//! Metric names emitted by the verify flow.

pub const VERIFY_OK: &str = "verifier.verify.ok";
pub const VERIFY_KO: &str = "verifier.verify.ko";
pub const KO_EVENT_EMIT_FAILED: &str = "verifier.ko_event.emit_failed";
