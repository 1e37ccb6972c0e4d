// orchestrator-service-rs/src/error.rs
// Stage failures of the planning pipeline.

use action_ledger::LedgerError;
use input_validation_rs::ValidationError;
use llm_service_rs::ModelError;
use telemetrist::TelemetryError;
use thiserror::Error;
use tools_service_rs::ToolError;

/// Failure of the itinerary generation stage. Always terminal for the request.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("GenerationFailed: {0}")]
    Model(#[from] ModelError),

    #[error("GenerationFailed: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("audit ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("metrics: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("tools: {0}")]
    Tools(#[from] ToolError),
}
