// shared-types-rs/src/config.rs
// Planner configuration: optional TOML file, then PLANNER_* environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "./config/planner.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub model: ModelConfig,
    pub tools: ToolsConfig,
    pub audit: AuditConfig,
    pub pipeline: PipelineConfig,
}

/// Text-completion runtime (Ollama-compatible)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub temperature: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 60,
            max_attempts: 2,
            backoff_ms: 250,
            temperature: 0.2,
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// External lookup services
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub geocoding_url: String,
    pub weather_url: String,
    pub weather_archive_url: String,
    pub attractions_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub attractions_per_category: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1".to_string(),
            weather_url: "https://api.open-meteo.com/v1".to_string(),
            weather_archive_url: "https://archive-api.open-meteo.com/v1".to_string(),
            attractions_url: "https://en.wikipedia.org/w".to_string(),
            timeout_secs: 5,
            max_retries: 1,
            attractions_per_category: 5,
        }
    }
}

impl ToolsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    pub ledger_path: PathBuf,
    /// 64 hex characters; a development key is used when absent.
    pub key_hex: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("data/audit/ledger.bin"),
            key_hex: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub request_deadline_secs: u64,
    pub min_request_chars: usize,
    pub max_request_chars: usize,
    pub attraction_categories: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_deadline_secs: 180,
            min_request_chars: 5,
            max_request_chars: 2000,
            attraction_categories: [
                "culture",
                "nature",
                "food",
                "history",
                "art",
                "nightlife",
                "shopping",
                "beach",
                "adventure",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

impl PipelineConfig {
    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }
}

impl PlannerConfig {
    /// Load from `PLANNER_CONFIG_PATH` (or the default path) and apply
    /// environment overrides. A missing file at the default path is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = env::var("PLANNER_CONFIG_PATH").ok();
        let path = explicit
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else if explicit.is_some() {
            return Err(ConfigError::FileNotFound(path));
        } else {
            log::debug!("No config file at {}, using defaults", path);
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply `PLANNER_*` overrides through a lookup function.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            let raw = lookup(key)?;
            match raw.trim().parse::<T>() {
                Ok(value) => Some(value),
                Err(_) => {
                    log::warn!("Ignoring invalid value for {}: {}", key, raw);
                    None
                }
            }
        }

        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;

        if let Some(v) = lookup("PLANNER_MODEL_URL") {
            self.model.base_url = v;
        }
        if let Some(v) = lookup("PLANNER_MODEL_NAME") {
            self.model.model = v;
        }
        if let Some(v) = parsed(lookup, "PLANNER_MODEL_TIMEOUT_SECS") {
            self.model.timeout_secs = v;
        }
        if let Some(v) = parsed(lookup, "PLANNER_MODEL_MAX_ATTEMPTS") {
            self.model.max_attempts = v;
        }
        if let Some(v) = lookup("PLANNER_GEOCODING_URL") {
            self.tools.geocoding_url = v;
        }
        if let Some(v) = lookup("PLANNER_WEATHER_URL") {
            self.tools.weather_url = v;
        }
        if let Some(v) = lookup("PLANNER_WEATHER_ARCHIVE_URL") {
            self.tools.weather_archive_url = v;
        }
        if let Some(v) = lookup("PLANNER_ATTRACTIONS_URL") {
            self.tools.attractions_url = v;
        }
        if let Some(v) = parsed(lookup, "PLANNER_TOOL_TIMEOUT_SECS") {
            self.tools.timeout_secs = v;
        }
        if let Some(v) = lookup("PLANNER_AUDIT_PATH") {
            self.audit.ledger_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("PLANNER_AUDIT_KEY") {
            self.audit.key_hex = Some(v);
        }
        if let Some(v) = parsed(lookup, "PLANNER_REQUEST_DEADLINE_SECS") {
            self.pipeline.request_deadline_secs = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.base_url.is_empty() {
            return Err(ConfigError::InvalidValue("model.base_url is required".to_string()));
        }
        if self.model.max_attempts == 0 {
            return Err(ConfigError::InvalidValue("model.max_attempts must be at least 1".to_string()));
        }
        if self.model.timeout_secs == 0 || self.tools.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("timeouts must be non-zero".to_string()));
        }
        if self.pipeline.min_request_chars > self.pipeline.max_request_chars {
            return Err(ConfigError::InvalidValue(
                "pipeline.min_request_chars exceeds max_request_chars".to_string(),
            ));
        }
        if let Some(key) = &self.audit.key_hex {
            if key.trim().len() != 64 {
                return Err(ConfigError::InvalidValue("audit.key_hex must be 64 hex characters".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PlannerConfig::from_toml_str(
            r#"
            [model]
            model = "mistral"

            [tools]
            timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.model.model, "mistral");
        assert_eq!(config.model.max_attempts, 2);
        assert_eq!(config.tools.timeout_secs, 3);
        assert!(config.pipeline.attraction_categories.contains(&"food".to_string()));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PLANNER_MODEL_URL", "http://model:11434"),
            ("PLANNER_TOOL_TIMEOUT_SECS", "9"),
            ("PLANNER_MODEL_MAX_ATTEMPTS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = PlannerConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.model.base_url, "http://model:11434");
        assert_eq!(config.tools.timeout_secs, 9);
        assert_eq!(config.model.max_attempts, 2);
    }

    #[test]
    fn test_validation() {
        let mut config = PlannerConfig::default();
        assert!(config.validate().is_ok());

        config.audit.key_hex = Some("abcd".to_string());
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.model.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.toml");
        fs::write(&path, "[audit]\nledger_path = \"/tmp/x.bin\"\n").unwrap();

        let config = PlannerConfig::from_file(&path).unwrap();
        assert_eq!(config.audit.ledger_path, PathBuf::from("/tmp/x.bin"));
    }
}
