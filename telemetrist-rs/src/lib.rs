//! # Telemetrist
//!
//! Process-wide metrics for the planner pipeline, exposed in the Prometheus
//! text format, plus PII redaction for anything persisted from user input.

pub mod error;
pub mod metrics_sink;
pub mod redaction;

pub use error::TelemetryError;
pub use metrics_sink::{MetricsSink, STAGE_BUCKETS};
pub use redaction::{preview, PiiRedactor, DEFAULT_PREVIEW_CHARS};
