//! Ollama client implementation
//!
//! Talks to a local (or remote) Ollama-compatible runtime through the
//! non-streaming generate endpoint. Each call is a single attempt; callers
//! layer their own retry policy on top.

mod models;
pub use models::*;

use std::time::{Duration, Instant};

use log::debug;
use reqwest::Client;

use crate::config::{OllamaConfig, ServiceConfig};
use crate::core::{endpoint_url, ServiceClient};
use crate::error::{ErrorContext, Result, ServiceError};
use crate::services::common::{build_http_client, decode_response, UserAgent};

const GENERATE_ENDPOINT: &str = "api/generate";

/// Ollama client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http_client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a client; fails when the configuration is invalid
    pub fn new(config: OllamaConfig) -> Result<Self> {
        config.validate()?;

        let http_client = build_http_client(
            Some(UserAgent::for_client("ollama-client")),
            Some(Duration::from_secs(config.timeout_seconds)),
        )?;

        Ok(Self { http_client, config })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Build a generate request for `prompt` from the client configuration
    pub fn request_for(&self, prompt: &str) -> GenerateRequest {
        let mut request = GenerateRequest::new(self.config.model.clone(), prompt);

        if self.config.json_mode {
            request.format = Some("json".to_string());
        }
        if let Some(temperature) = self.config.temperature {
            request.options = Some(GenerateOptions {
                temperature: Some(temperature),
                ..GenerateOptions::default()
            });
        }

        request
    }

    /// Send one generate request. `timeout` overrides the client-wide timeout.
    pub async fn generate(&self, request: &GenerateRequest, timeout: Option<Duration>) -> Result<GenerateResponse> {
        let url = endpoint_url(&self.config.base_url, GENERATE_ENDPOINT);
        debug!("Sending request to Ollama: POST {} (model {})", url, request.model);

        let start_time = Instant::now();

        let mut builder = self.http_client.post(&url).json(request);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            ServiceError::from(e).with_context(ErrorContext::for_service(self.name()).endpoint(GENERATE_ENDPOINT))
        })?;

        let generated: GenerateResponse = decode_response(self.name(), GENERATE_ENDPOINT, response).await?;

        debug!(
            "Ollama answered in {:?} ({} chars, done={})",
            start_time.elapsed(),
            generated.response.len(),
            generated.done
        );

        Ok(generated)
    }

    /// Complete `prompt` and return only the generated text
    pub async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String> {
        let request = self.request_for(prompt);
        let response = self.generate(&request, Some(timeout)).await?;
        Ok(response.response)
    }
}

impl ServiceClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}
