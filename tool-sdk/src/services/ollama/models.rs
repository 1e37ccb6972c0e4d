//! Ollama data models
//!
//! Only the non-streaming `/api/generate` call is modelled.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,

    /// Always false: the client reads a single JSON object back
    pub stream: bool,

    /// `"json"` constrains the output to a JSON document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
            format: None,
            system: None,
            options: None,
        }
    }
}

/// Sampling options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

/// Response body for a non-streaming generate call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: String,

    /// Generated text; empty when the model produced nothing
    #[serde(default)]
    pub response: String,

    #[serde(default)]
    pub done: bool,

    #[serde(default)]
    pub done_reason: Option<String>,

    /// Nanoseconds
    #[serde(default)]
    pub total_duration: Option<u64>,

    #[serde(default)]
    pub eval_count: Option<u32>,
}
