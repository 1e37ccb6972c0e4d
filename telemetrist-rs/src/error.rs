use thiserror::Error;

/// Telemetry errors
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Metrics recorder error: {0}")]
    Recorder(String),
}

impl From<metrics_exporter_prometheus::BuildError> for TelemetryError {
    fn from(error: metrics_exporter_prometheus::BuildError) -> Self {
        TelemetryError::Recorder(error.to_string())
    }
}
