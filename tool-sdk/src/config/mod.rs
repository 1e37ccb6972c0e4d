//! Configuration for service clients
//!
//! Each client takes a plain config struct. Values come from the planner
//! configuration; the structs only know how to validate themselves.

use std::fmt::Debug;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ServiceError};
use crate::resilience::RetryConfig;

/// Common behaviour for client configuration structs
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;

    /// Service name
    fn service_name(&self) -> &str;
}

fn check_url(service: &str, field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ServiceError::configuration(format!("{} {} is required", service, field)));
    }
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| ServiceError::configuration(format!("{} {} is not a valid URL: {}", service, field, e)))
}

/// Ollama-compatible completion runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    /// Sampling temperature passed through `options`
    pub temperature: Option<f64>,
    /// Ask the runtime to constrain output to JSON
    pub json_mode: bool,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            temperature: None,
            json_mode: false,
            timeout_seconds: 60,
        }
    }
}

impl ServiceConfig for OllamaConfig {
    fn validate(&self) -> Result<()> {
        check_url("Ollama", "base URL", &self.base_url)?;
        if self.model.trim().is_empty() {
            return Err(ServiceError::configuration("Ollama model name is required"));
        }
        if self.timeout_seconds == 0 {
            return Err(ServiceError::configuration("Ollama timeout must be non-zero"));
        }
        Ok(())
    }

    fn service_name(&self) -> &str {
        "ollama"
    }
}

/// Open-Meteo geocoding, forecast and historical archive endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenMeteoConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub archive_url: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub language: String,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1".to_string(),
            forecast_url: "https://api.open-meteo.com/v1".to_string(),
            archive_url: "https://archive-api.open-meteo.com/v1".to_string(),
            timeout_seconds: 5,
            max_retries: 1,
            language: "en".to_string(),
        }
    }
}

impl OpenMeteoConfig {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            ..RetryConfig::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ServiceConfig for OpenMeteoConfig {
    fn validate(&self) -> Result<()> {
        check_url("Open-Meteo", "geocoding URL", &self.geocoding_url)?;
        check_url("Open-Meteo", "forecast URL", &self.forecast_url)?;
        check_url("Open-Meteo", "archive URL", &self.archive_url)?;
        if self.timeout_seconds == 0 {
            return Err(ServiceError::configuration("Open-Meteo timeout must be non-zero"));
        }
        Ok(())
    }

    fn service_name(&self) -> &str {
        "open-meteo"
    }
}

/// MediaWiki search API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    /// Script path, e.g. `https://en.wikipedia.org/w`
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/w".to_string(),
            timeout_seconds: 5,
            max_retries: 1,
        }
    }
}

impl WikipediaConfig {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            ..RetryConfig::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ServiceConfig for WikipediaConfig {
    fn validate(&self) -> Result<()> {
        check_url("Wikipedia", "base URL", &self.base_url)?;
        if self.timeout_seconds == 0 {
            return Err(ServiceError::configuration("Wikipedia timeout must be non-zero"));
        }
        Ok(())
    }

    fn service_name(&self) -> &str {
        "wikipedia"
    }
}
