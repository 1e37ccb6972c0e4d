//! Error handling for the Tool SDK
//!
//! Every client returns `ServiceError`. Variants describe what went wrong at
//! the transport or protocol level; callers map them onto their own domain
//! error kinds. `Retryable` is the seam the retry executor works against.

use std::fmt;
use thiserror::Error;

pub mod mapping;

/// Result type for Tool SDK operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that decide whether an operation may be attempted again.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Main error type for the Tool SDK
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Connection refused, DNS failure, reset stream
    #[error("Network error: {0}")]
    Network(String),

    /// The call did not finish within its time budget
    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// The service rejected the request as malformed (4xx)
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 5xx from the service
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parsing error: {0}")]
    Parsing(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors with additional context
    #[error("{inner}")]
    WithContext {
        inner: Box<ServiceError>,
        context: ErrorContext,
    },
}

impl ServiceError {
    pub fn network(message: impl Into<String>) -> Self {
        ServiceError::Network(message.into())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        ServiceError::Timeout(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        ServiceError::Authentication(message.into())
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        ServiceError::RateLimit(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        ServiceError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn parsing(message: impl Into<String>) -> Self {
        ServiceError::Parsing(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ServiceError::Configuration(message.into())
    }

    /// Add context to an existing error
    pub fn with_context(self, context: ErrorContext) -> Self {
        ServiceError::WithContext {
            inner: Box::new(self),
            context,
        }
    }

    /// The underlying error with all context layers removed
    pub fn root(&self) -> &ServiceError {
        match self {
            ServiceError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Get the service name if available
    pub fn service_name(&self) -> Option<&str> {
        match self {
            ServiceError::WithContext { context, .. } => Some(&context.service),
            _ => None,
        }
    }

    /// Get the HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceError::WithContext { context, inner } => {
                context.status_code.or_else(|| inner.status_code())
            }
            ServiceError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is a permanent error (not retryable)
    pub fn is_permanent(&self) -> bool {
        !self.is_retryable()
    }
}

impl Retryable for ServiceError {
    /// Network failures, timeouts and 5xx responses. Rate limits are not
    /// retried: the public services ask callers to back off for minutes.
    fn is_retryable(&self) -> bool {
        match self.root() {
            ServiceError::Network(_) => true,
            ServiceError::Timeout(_) => true,
            ServiceError::Server { .. } => true,
            _ => false,
        }
    }
}

/// Error context information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Service that generated the error
    pub service: String,

    /// HTTP status code if applicable
    pub status_code: Option<u16>,

    /// Endpoint that was called
    pub endpoint: Option<String>,

    /// Number of attempts made before giving up
    pub attempts: Option<u32>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            service: "unknown".to_string(),
            status_code: None,
            endpoint: None,
            attempts: None,
        }
    }
}

impl ErrorContext {
    /// Create a new error context for a specific service
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service={}", self.service)?;
        if let Some(endpoint) = &self.endpoint {
            write!(f, " endpoint={}", endpoint)?;
        }
        if let Some(status) = self.status_code {
            write!(f, " status={}", status)?;
        }
        if let Some(attempts) = self.attempts {
            write!(f, " attempts={}", attempts)?;
        }
        Ok(())
    }
}

/// Convert reqwest errors to ServiceError
impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::timeout(format!("Request timed out: {}", err))
        } else if err.is_connect() || err.is_redirect() {
            ServiceError::network(format!("Connection error: {}", err))
        } else if err.is_decode() {
            ServiceError::parsing(format!("Response decode error: {}", err))
        } else if err.is_builder() {
            ServiceError::configuration(format!("Invalid request: {}", err))
        } else if let Some(status) = err.status() {
            mapping::map_http_error(status, &err.to_string())
        } else {
            ServiceError::network(format!("HTTP client error: {}", err))
        }
    }
}

/// Convert serde_json errors to ServiceError
impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::parsing(format!("JSON error: {}", err))
    }
}
