//! Decision Engine
//!
//! Pure mapping from a trip intent to the tool calls worth making. No I/O
//! and no model calls; the same intent always yields the same decision.
//!
//! Rules, evaluated in this order:
//!
//! 1. weather is requested for every trip of at least one day
//! 2. attractions are requested when an interest names a known category,
//!    and only for the matching categories

use std::collections::BTreeSet;

use shared_types_rs::config::PipelineConfig;
use shared_types_rs::{ToolDecision, TripIntent};

#[derive(Debug, Clone)]
pub struct DecisionEngine {
    known_categories: BTreeSet<String>,
}

impl DecisionEngine {
    pub fn new<I, S>(known_categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            known_categories: known_categories
                .into_iter()
                .map(|c| c.as_ref().trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.attraction_categories)
    }

    pub fn known_categories(&self) -> impl Iterator<Item = &str> {
        self.known_categories.iter().map(String::as_str)
    }

    pub fn decide(&self, intent: &TripIntent) -> ToolDecision {
        let mut reasons = Vec::with_capacity(2);

        let needs_weather = intent.duration_days >= 1;
        if needs_weather {
            reasons.push(format!(
                "weather: {}-day trip, the forecast shapes indoor and outdoor days",
                intent.duration_days
            ));
        } else {
            reasons.push("weather: skipped, trip has no days".to_string());
        }

        let attraction_categories: Vec<String> = intent
            .interests
            .iter()
            .filter(|interest| self.known_categories.contains(interest.as_str()))
            .cloned()
            .collect();
        let needs_attractions = !attraction_categories.is_empty();

        if needs_attractions {
            reasons.push(format!(
                "attractions: interests match {}",
                attraction_categories.join(", ")
            ));
        } else if intent.interests.is_empty() {
            reasons.push("attractions: skipped, no interests given".to_string());
        } else {
            reasons.push(format!(
                "attractions: skipped, no known category in {}",
                intent.interests.iter().cloned().collect::<Vec<_>>().join(", ")
            ));
        }

        ToolDecision {
            needs_weather,
            needs_attractions,
            attraction_categories,
            reasons,
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(days: u32, interests: &[&str]) -> TripIntent {
        TripIntent {
            origin: Some("Berlin".to_string()),
            destination: "Barcelona".to_string(),
            start_date: None,
            duration_days: days,
            budget: None,
            interests: interests.iter().map(|s| s.to_string()).collect(),
            party_size: 1,
        }
    }

    #[test]
    fn test_culture_and_food_request_both_tools() {
        let decision = DecisionEngine::default().decide(&intent(4, &["culture", "food"]));

        assert!(decision.needs_weather);
        assert!(decision.needs_attractions);
        assert_eq!(decision.attraction_categories, vec!["culture", "food"]);
        assert_eq!(decision.reasons.len(), 2);
        assert!(decision.reasons[0].starts_with("weather:"));
        assert!(decision.reasons[1].starts_with("attractions:"));
    }

    #[test]
    fn test_unknown_interests_skip_attractions() {
        let decision = DecisionEngine::default().decide(&intent(3, &["karaoke"]));

        assert!(decision.needs_weather);
        assert!(!decision.needs_attractions);
        assert!(decision.attraction_categories.is_empty());
        assert!(decision.reasons[1].contains("karaoke"));
    }

    #[test]
    fn test_no_interests_skip_attractions() {
        let decision = DecisionEngine::default().decide(&intent(1, &[]));
        assert!(!decision.needs_attractions);
        assert_eq!(decision.reasons[1], "attractions: skipped, no interests given");
    }

    #[test]
    fn test_only_matching_categories_are_kept() {
        let decision = DecisionEngine::default().decide(&intent(5, &["beach", "karaoke", "nature"]));
        assert_eq!(decision.attraction_categories, vec!["beach", "nature"]);
    }

    #[test]
    fn test_custom_category_set() {
        let engine = DecisionEngine::new([" Wine ", "", "hiking"]);
        assert_eq!(engine.known_categories().collect::<Vec<_>>(), vec!["hiking", "wine"]);

        let decision = engine.decide(&intent(2, &["wine", "food"]));
        assert_eq!(decision.attraction_categories, vec!["wine"]);
    }

    #[test]
    fn test_decision_is_deterministic() {
        let engine = DecisionEngine::default();
        let trip = intent(7, &["history", "art", "nightlife"]);
        assert_eq!(engine.decide(&trip), engine.decide(&trip));
    }

    #[test]
    fn test_rule_table_is_total() {
        let engine = DecisionEngine::default();
        for days in 1..=30 {
            for interests in [&[][..], &["food"][..], &["opera"][..]] {
                let decision = engine.decide(&intent(days, interests));
                assert!(decision.needs_weather);
                assert_eq!(decision.needs_attractions, interests.contains(&"food"));
                assert_eq!(decision.reasons.len(), 2);
            }
        }
    }
}
