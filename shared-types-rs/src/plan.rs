// shared-types-rs/src/plan.rs
// Itinerary, the terminal PlanResult, and the ingress/egress wire shapes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tools::{AttractionsPayload, ToolDecision, ToolResult, WeatherPayload};
use crate::trip::TripIntent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day_index: u32,
    pub summary: String,
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Success => "success",
            PlanStatus::PartialSuccess => "partial_success",
            PlanStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal artifact of one pipeline run.
///
/// When `status` is `Failed` the itinerary is always empty and `error`
/// carries the summary; otherwise the itinerary has exactly
/// `trip_intent.duration_days` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub request_id: Uuid,
    pub trip_intent: Option<TripIntent>,
    pub decision: Option<ToolDecision>,
    pub tool_results: Vec<ToolResult>,
    pub itinerary: Vec<ItineraryDay>,
    pub status: PlanStatus,
    pub error: Option<String>,
}

impl PlanResult {
    pub fn weather(&self) -> Option<&WeatherPayload> {
        self.tool_results.iter().find_map(ToolResult::weather)
    }

    pub fn attractions(&self) -> Option<&AttractionsPayload> {
        self.tool_results.iter().find_map(ToolResult::attractions)
    }
}

/// Ingress body handed over by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub request_id: Option<Uuid>,
    pub request: String,
}

/// JSON body returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub request_id: Uuid,
    pub status: PlanStatus,
    pub parsed_data: Option<TripIntent>,
    pub decision: Option<ToolDecision>,
    pub weather: Option<WeatherPayload>,
    pub attractions: Option<AttractionsPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<Vec<ItineraryDay>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tool_errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&PlanResult> for PlanResponse {
    fn from(result: &PlanResult) -> Self {
        let itinerary = match result.status {
            PlanStatus::Failed => None,
            _ => Some(result.itinerary.clone()),
        };

        let tool_errors = result
            .tool_results
            .iter()
            .filter(|r| r.is_error())
            .map(|r| format!("{}: {}", r.tool, r.error_message().unwrap_or("unavailable")))
            .collect();

        Self {
            request_id: result.request_id,
            status: result.status,
            parsed_data: result.trip_intent.clone(),
            decision: result.decision.clone(),
            weather: result.weather().cloned(),
            attractions: result.attractions().cloned(),
            itinerary,
            tool_errors,
            error: result.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolErrorKind, ToolName};

    #[test]
    fn test_failed_response_has_no_itinerary() {
        let result = PlanResult {
            request_id: Uuid::new_v4(),
            trip_intent: None,
            decision: None,
            tool_results: vec![],
            itinerary: vec![],
            status: PlanStatus::Failed,
            error: Some("ModelEmptyOutput".to_string()),
        };

        let json = serde_json::to_value(PlanResponse::from(&result)).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json.get("itinerary").is_none());
        assert_eq!(json["error"], "ModelEmptyOutput");
    }

    #[test]
    fn test_ingress_without_request_id() {
        let req: PlanRequest = serde_json::from_str(r#"{"request": "3 days in Oslo"}"#).unwrap();
        assert!(req.request_id.is_none());
        assert_eq!(req.request, "3 days in Oslo");
    }

    #[test]
    fn test_tool_errors_are_listed() {
        let result = PlanResult {
            request_id: Uuid::new_v4(),
            trip_intent: None,
            decision: None,
            tool_results: vec![ToolResult::error(
                ToolName::Weather,
                3,
                ToolErrorKind::Timeout,
                "timed out after 5s",
            )],
            itinerary: vec![],
            status: PlanStatus::PartialSuccess,
            error: None,
        };

        let response = PlanResponse::from(&result);
        assert_eq!(response.tool_errors, vec!["weather: timed out after 5s".to_string()]);
        assert_eq!(response.itinerary, Some(vec![]));
    }
}
