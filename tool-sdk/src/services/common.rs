//! Common utilities for service clients

use std::fmt;
use std::time::Duration;

use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{mapping, ErrorContext, Result, ServiceError};

/// UserAgent structure for identifying the client to upstream services
///
/// The public Open-Meteo and MediaWiki APIs ask for a descriptive agent.
#[derive(Debug, Clone)]
pub struct UserAgent {
    pub app_name: String,
    pub version: String,
    pub extra: Option<String>,
}

impl Default for UserAgent {
    fn default() -> Self {
        Self {
            app_name: "vacation-planner".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            extra: Some("tool-sdk".to_string()),
        }
    }
}

impl UserAgent {
    pub fn for_client(extra: &str) -> Self {
        Self {
            extra: Some(extra.to_string()),
            ..Self::default()
        }
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_name, self.version)?;

        if let Some(ref extra) = self.extra {
            write!(f, " ({})", extra)?;
        }

        Ok(())
    }
}

/// Build a standard HTTP client with default settings
pub fn build_http_client(user_agent: Option<UserAgent>, timeout: Option<Duration>) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    let ua = user_agent.unwrap_or_default().to_string();

    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_str(&ua)
            .map_err(|e| ServiceError::configuration(format!("Invalid user agent: {}", e)))?,
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout.unwrap_or_else(|| Duration::from_secs(30)))
        .gzip(true)
        .build()
        .map_err(|e| ServiceError::configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a non-success response into a ServiceError carrying service and endpoint
pub async fn parse_error_response(service_name: &str, endpoint: &str, response: Response) -> ServiceError {
    let status = response.status();

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("Failed to read error response: {}", e),
    };

    mapping::map_http_error(status, &body).with_context(
        ErrorContext::for_service(service_name)
            .endpoint(endpoint)
            .status_code(status.as_u16()),
    )
}

/// Check the status and decode a JSON body
pub async fn decode_response<R>(service_name: &str, endpoint: &str, response: Response) -> Result<R>
where
    R: DeserializeOwned,
{
    if !response.status().is_success() {
        return Err(parse_error_response(service_name, endpoint, response).await);
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        ServiceError::parsing(format!("Failed to parse response: {}", e))
            .with_context(ErrorContext::for_service(service_name).endpoint(endpoint))
    })
}
