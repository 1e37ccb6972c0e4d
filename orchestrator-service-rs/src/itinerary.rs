//! Itinerary Generator
//!
//! One model call grounded in the tool results, then the itinerary shape
//! check. A rejected itinerary is a failure; there is no fallback plan.

use std::sync::Arc;
use std::time::Duration;

use input_validation_rs::validate_itinerary;
use llm_service_rs::ModelGateway;
use log::{debug, warn};
use serde_json::Value;
use shared_types_rs::{ItineraryDay, ToolResult, TripIntent};

use crate::error::GenerationError;
use crate::prompts::itinerary_prompt;

#[derive(Clone)]
pub struct ItineraryGenerator {
    gateway: Arc<dyn ModelGateway>,
    timeout: Duration,
}

impl ItineraryGenerator {
    pub fn new(gateway: Arc<dyn ModelGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    pub async fn generate(
        &self,
        intent: &TripIntent,
        tool_results: &[ToolResult],
    ) -> Result<Vec<ItineraryDay>, GenerationError> {
        let prompt = itinerary_prompt(intent, tool_results);
        debug!(
            "Generating {}-day itinerary for {} via {}",
            intent.duration_days,
            intent.destination,
            self.gateway.name()
        );

        let text = self.gateway.complete(&prompt, self.timeout).await?;

        validate_itinerary(&Value::String(text), intent.duration_days).map_err(|e| {
            warn!("Itinerary for {} rejected: {}", intent.destination, e);
            GenerationError::Invalid(e)
        })
    }
}
