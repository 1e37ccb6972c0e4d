// shared-types-rs/src/tools.rs
// Tool decisions and the results produced by the external lookup tools.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// External data sources the pipeline can consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    Geocoding,
    Weather,
    Attractions,
}

impl ToolName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Geocoding => "geocoding",
            ToolName::Weather => "weather",
            ToolName::Attractions => "attractions",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which tools to call for a trip, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDecision {
    pub needs_weather: bool,
    pub needs_attractions: bool,
    /// Interests that matched a known attraction category, sorted.
    pub attraction_categories: Vec<String>,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingPayload {
    pub place: String,
    pub country: Option<String>,
    pub coordinates: Coordinates,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temperature_max_c: Option<f64>,
    pub temperature_min_c: Option<f64>,
    pub precipitation_probability: Option<u8>,
    pub precipitation_mm: Option<f64>,
}

/// Where the daily figures came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    /// Live forecast for the travel dates.
    Forecast,
    /// Observed weather for the same dates one year earlier; used when the
    /// trip is beyond the forecast horizon.
    Seasonal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub location: String,
    pub source: WeatherSource,
    pub days: Vec<DailyForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractionsPayload {
    pub destination: String,
    pub attractions: Vec<Attraction>,
}

/// Why a tool call produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// The call exceeded its timeout on every attempt.
    Timeout,
    /// Network failure or a 5xx from the service.
    Unavailable,
    /// The service refused the request (4xx); never retried.
    Rejected,
    /// The service answered but had nothing for the query.
    NotFound,
    /// The response could not be mapped into a payload.
    InvalidResponse,
    /// A prerequisite tool failed, so this call was not attempted.
    DependencyFailed,
    /// The run was cancelled before the call answered.
    Cancelled,
}

impl ToolErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolErrorKind::Timeout => "timeout",
            ToolErrorKind::Unavailable => "unavailable",
            ToolErrorKind::Rejected => "rejected",
            ToolErrorKind::NotFound => "not_found",
            ToolErrorKind::InvalidResponse => "invalid_response",
            ToolErrorKind::DependencyFailed => "dependency_failed",
            ToolErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolOutcome {
    Geocoding(GeocodingPayload),
    Weather(WeatherPayload),
    Attractions(AttractionsPayload),
    Error { error: ToolErrorKind, message: String },
}

/// Outcome of exactly one attempted tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool: ToolName,
    pub latency_ms: u64,
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn error(tool: ToolName, latency_ms: u64, kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            tool,
            latency_ms,
            outcome: ToolOutcome::Error {
                error: kind,
                message: message.into(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Error { .. })
    }

    /// Short outcome label used in audit records and metrics.
    pub fn outcome_label(&self) -> &'static str {
        match &self.outcome {
            ToolOutcome::Error { error, .. } => error.as_str(),
            _ => "ok",
        }
    }

    pub fn geocoding(&self) -> Option<&GeocodingPayload> {
        match &self.outcome {
            ToolOutcome::Geocoding(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn weather(&self) -> Option<&WeatherPayload> {
        match &self.outcome {
            ToolOutcome::Weather(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn attractions(&self) -> Option<&AttractionsPayload> {
        match &self.outcome {
            ToolOutcome::Attractions(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            ToolOutcome::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}
