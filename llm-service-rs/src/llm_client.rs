// llm-service-rs/src/llm_client.rs
//
// Model gateway backed by an Ollama-compatible runtime.
//
// - One HTTP call per attempt through tool-sdk's OllamaClient
// - Bounded retry (fixed attempt count, short fixed backoff) on transport
//   failures and blank output
// - No retry when the runtime refuses the request
//
// Whether the returned text has the right structure is not checked here;
// that is the schema validator's job.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use shared_types_rs::config::ModelConfig;
use tool_sdk::ollama::OllamaClient;
use tool_sdk::{OllamaConfig, RetryConfig, RetryExecutor};

use crate::error::ModelError;
use crate::gateway::{is_degenerate, ModelGateway};

#[derive(Debug, Clone)]
pub struct OllamaGateway {
    client: OllamaClient,
    retry: RetryExecutor,
}

impl OllamaGateway {
    pub fn new(client: OllamaClient, retry: RetryConfig) -> Self {
        Self {
            client,
            retry: RetryExecutor::new(retry),
        }
    }

    /// Build the gateway from the planner's model section
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        let client = OllamaClient::new(OllamaConfig {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: Some(config.temperature),
            json_mode: false,
            timeout_seconds: config.timeout_secs,
        })
        .map_err(|e| ModelError::Rejected(e.to_string()))?;

        let retry = RetryConfig::fixed(
            config.max_attempts.saturating_sub(1),
            Duration::from_millis(config.backoff_ms),
        );

        log::info!(
            "Model gateway initialized: {} at {} ({} attempts)",
            config.model,
            config.base_url,
            retry.max_attempts()
        );

        Ok(Self::new(client, retry))
    }

    async fn attempt(&self, prompt: &str, timeout: Duration) -> Result<String, ModelError> {
        let text = match tokio::time::timeout(timeout, self.client.complete(prompt, timeout)).await {
            Ok(result) => result?,
            Err(_) => return Err(ModelError::Unavailable(format!("no answer within {:?}", timeout))),
        };

        if is_degenerate(&text) {
            return Err(ModelError::EmptyOutput(format!(
                "runtime returned {} characters without content",
                text.len()
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl ModelGateway for OllamaGateway {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ModelError> {
        let start = Instant::now();
        log::debug!("Preparing model request ({} prompt chars)", prompt.len());

        let result = self.retry.execute(|| self.attempt(prompt, timeout)).await;

        match &result {
            Ok(text) => log::debug!("Model answered in {:?} ({} chars)", start.elapsed(), text.len()),
            Err(err) => log::warn!("Model request failed after {:?}: {}", start.elapsed(), err),
        }

        result
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
