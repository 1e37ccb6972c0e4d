//! Tool error type
//!
//! Maps normalized SDK errors onto the tool error kinds recorded in
//! `ToolResult` and the audit trail.

use shared_types_rs::ToolErrorKind;
use thiserror::Error;
use tool_sdk::ServiceError;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidResponse, message)
    }
}

impl From<ServiceError> for ToolError {
    fn from(error: ServiceError) -> Self {
        let message = error.to_string();
        let kind = match error.root() {
            ServiceError::Timeout(_) => ToolErrorKind::Timeout,
            ServiceError::Network(_) | ServiceError::Server { .. } => ToolErrorKind::Unavailable,
            ServiceError::Authentication(_) | ServiceError::RateLimit(_) | ServiceError::Validation(_) => {
                ToolErrorKind::Rejected
            }
            ServiceError::NotFound(_) => ToolErrorKind::NotFound,
            ServiceError::Parsing(_) => ToolErrorKind::InvalidResponse,
            ServiceError::Configuration(_) | ServiceError::WithContext { .. } => ToolErrorKind::Rejected,
        };
        ToolError { kind, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tool_sdk::ErrorContext;

    #[test]
    fn test_service_error_kinds() {
        let cases = vec![
            (ServiceError::timeout("5s"), ToolErrorKind::Timeout),
            (ServiceError::network("refused"), ToolErrorKind::Unavailable),
            (ServiceError::server(502, "bad gateway"), ToolErrorKind::Unavailable),
            (ServiceError::rate_limit("slow down"), ToolErrorKind::Rejected),
            (ServiceError::validation("bad latitude"), ToolErrorKind::Rejected),
            (ServiceError::not_found("no page"), ToolErrorKind::NotFound),
            (ServiceError::parsing("expected object"), ToolErrorKind::InvalidResponse),
        ];

        for (error, expected) in cases {
            assert_eq!(ToolError::from(error).kind, expected);
        }
    }

    #[test]
    fn test_context_is_unwrapped() {
        let error = ServiceError::timeout("5s").with_context(ErrorContext::for_service("open-meteo").attempts(2));
        let tool_error = ToolError::from(error);
        assert_eq!(tool_error.kind, ToolErrorKind::Timeout);
        assert!(tool_error.message.contains("5s"));
    }
}
