// llm-service-rs/src/error.rs
//
// Gateway error taxonomy. Transport failures and blank output are worth
// another draw; a runtime that refuses the request is not.

use thiserror::Error;
use tool_sdk::{Retryable, ServiceError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Connection refused, timeout, or 5xx from the runtime
    #[error("ModelUnavailable: {0}")]
    Unavailable(String),

    /// The runtime answered but the text is blank or degenerate
    #[error("ModelEmptyOutput: {0}")]
    EmptyOutput(String),

    /// The runtime refused the request (unknown model, bad request, 4xx)
    #[error("ModelUnavailable: request rejected: {0}")]
    Rejected(String),
}

impl Retryable for ModelError {
    fn is_retryable(&self) -> bool {
        matches!(self, ModelError::Unavailable(_) | ModelError::EmptyOutput(_))
    }
}

impl From<ServiceError> for ModelError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err.root() {
            ServiceError::Network(_) | ServiceError::Timeout(_) | ServiceError::Server { .. } => {
                ModelError::Unavailable(message)
            }
            ServiceError::Authentication(_)
            | ServiceError::RateLimit(_)
            | ServiceError::Validation(_)
            | ServiceError::NotFound(_)
            | ServiceError::Parsing(_)
            | ServiceError::Configuration(_)
            | ServiceError::WithContext { .. } => ModelError::Rejected(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tool_sdk::ErrorContext;

    #[test]
    fn test_service_errors_map_by_root_cause() {
        let timeout = ServiceError::timeout("30s").with_context(ErrorContext::for_service("ollama"));
        assert!(matches!(ModelError::from(timeout), ModelError::Unavailable(_)));

        assert!(matches!(
            ModelError::from(ServiceError::server(503, "loading model")),
            ModelError::Unavailable(_)
        ));
        assert!(matches!(
            ModelError::from(ServiceError::not_found("model 'x' not found")),
            ModelError::Rejected(_)
        ));
    }

    #[test]
    fn test_retry_classification() {
        assert!(ModelError::Unavailable("refused".into()).is_retryable());
        assert!(ModelError::EmptyOutput("blank".into()).is_retryable());
        assert!(!ModelError::Rejected("400".into()).is_retryable());
    }

    #[test]
    fn test_display_names_the_failure_class() {
        assert!(ModelError::EmptyOutput("blank response".into())
            .to_string()
            .starts_with("ModelEmptyOutput"));
    }
}
