//! Tool Manager Module
//!
//! Runs the tool calls a `ToolDecision` asks for. Geocoding and weather form
//! a chain (weather needs coordinates); attractions run alongside it. Every
//! attempted call yields exactly one `ToolResult`, and a call that never
//! answers is cut off by an outer deadline. Results are also written to a
//! `ToolLog` as they arrive.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, info, warn};
use shared_types_rs::config::ToolsConfig;
use shared_types_rs::{ToolDecision, ToolErrorKind, ToolName, ToolResult, TripIntent};
use tool_sdk::open_meteo::OpenMeteoClient;
use tool_sdk::wikipedia::WikipediaClient;
use tool_sdk::{OpenMeteoConfig, WikipediaConfig};

use crate::error::ToolError;
use crate::tool_log::ToolLog;
use crate::tools::{
    AttractionsQuery, AttractionsTool, GeocodingQuery, GeocodingTool, Tool, WeatherQuery, WeatherTool,
};

pub type SharedTool<Q> = Arc<dyn Tool<Query = Q>>;

/// Runs the planner's lookup tools
#[derive(Clone)]
pub struct ToolManager {
    geocoding: SharedTool<GeocodingQuery>,
    weather: SharedTool<WeatherQuery>,
    attractions: SharedTool<AttractionsQuery>,
    per_category: u32,
    /// Upper bound on one tool call, retries included
    call_deadline: Duration,
}

impl ToolManager {
    pub fn new(
        geocoding: SharedTool<GeocodingQuery>,
        weather: SharedTool<WeatherQuery>,
        attractions: SharedTool<AttractionsQuery>,
        per_category: u32,
        call_deadline: Duration,
    ) -> Self {
        Self {
            geocoding,
            weather,
            attractions,
            per_category,
            call_deadline,
        }
    }

    /// Build the Open-Meteo and Wikipedia tools from the planner configuration
    pub fn from_config(config: &ToolsConfig) -> Result<Self, ToolError> {
        let open_meteo = OpenMeteoClient::new(OpenMeteoConfig {
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.weather_url.clone(),
            archive_url: config.weather_archive_url.clone(),
            timeout_seconds: config.timeout_secs,
            max_retries: config.max_retries,
            ..OpenMeteoConfig::default()
        })?;
        let wikipedia = WikipediaClient::new(WikipediaConfig {
            base_url: config.attractions_url.clone(),
            timeout_seconds: config.timeout_secs,
            max_retries: config.max_retries,
        })?;

        // Every attempt may use its full timeout, plus backoff between them
        let attempts = config.max_retries + 1;
        let call_deadline = config.timeout() * attempts + Duration::from_secs(u64::from(attempts));

        info!(
            "Tool manager initialized: per-call timeout {:?}, {} attempts",
            config.timeout(),
            attempts
        );

        Ok(Self::new(
            Arc::new(GeocodingTool::new(open_meteo.clone())),
            Arc::new(WeatherTool::new(open_meteo)),
            Arc::new(AttractionsTool::new(wikipedia)),
            config.attractions_per_category,
            call_deadline,
        ))
    }

    async fn bounded<F>(&self, log: &ToolLog, tool: ToolName, call: F) -> ToolResult
    where
        F: Future<Output = ToolResult>,
    {
        log.start(tool);
        let result = self.deadline(tool, call).await;
        log.finish(result.clone());
        result
    }

    async fn deadline<F>(&self, tool: ToolName, call: F) -> ToolResult
    where
        F: Future<Output = ToolResult>,
    {
        match tokio::time::timeout(self.call_deadline, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Tool {} exceeded its {:?} deadline", tool, self.call_deadline);
                ToolResult::error(
                    tool,
                    self.call_deadline.as_millis() as u64,
                    ToolErrorKind::Timeout,
                    format!("no result within {:?}", self.call_deadline),
                )
            }
        }
    }

    async fn weather_chain(&self, intent: &TripIntent, today: NaiveDate, log: &ToolLog) -> Vec<ToolResult> {
        let geocoding = self
            .bounded(
                log,
                ToolName::Geocoding,
                self.geocoding.fetch(&GeocodingQuery {
                    place: intent.destination.clone(),
                }),
            )
            .await;

        let Some(location) = geocoding.geocoding().cloned() else {
            let reason = geocoding.error_message().unwrap_or("no location").to_string();
            let weather = ToolResult::error(
                ToolName::Weather,
                0,
                ToolErrorKind::DependencyFailed,
                format!("geocoding failed: {}", reason),
            );
            log.finish(weather.clone());
            return vec![geocoding, weather];
        };

        let query = WeatherQuery {
            location,
            start_date: intent.start_date,
            duration_days: intent.duration_days,
            today,
        };
        let weather = self.bounded(log, ToolName::Weather, self.weather.fetch(&query)).await;

        vec![geocoding, weather]
    }

    /// Run every tool the decision asks for.
    ///
    /// Results come back in a fixed order: geocoding, weather, attractions.
    pub async fn execute(&self, decision: &ToolDecision, intent: &TripIntent, today: NaiveDate) -> Vec<ToolResult> {
        self.execute_logged(decision, intent, today, &ToolLog::new()).await
    }

    /// Like `execute`, recording each call in `log` as it starts and
    /// finishes. If this future is dropped, `log` still holds what happened.
    pub async fn execute_logged(
        &self,
        decision: &ToolDecision,
        intent: &TripIntent,
        today: NaiveDate,
        log: &ToolLog,
    ) -> Vec<ToolResult> {
        debug!(
            "Executing tools for {}: weather={} attractions={}",
            intent.destination, decision.needs_weather, decision.needs_attractions
        );

        let weather = async {
            if decision.needs_weather {
                self.weather_chain(intent, today, log).await
            } else {
                Vec::new()
            }
        };

        let attractions = async {
            if !decision.needs_attractions {
                return None;
            }
            let query = AttractionsQuery {
                destination: intent.destination.clone(),
                categories: decision.attraction_categories.clone(),
                per_category: self.per_category,
            };
            Some(
                self.bounded(log, ToolName::Attractions, self.attractions.fetch(&query))
                    .await,
            )
        };

        let (mut results, attractions) = tokio::join!(weather, attractions);
        results.extend(attractions);

        let failed = results.iter().filter(|r| r.is_error()).count();
        if failed > 0 {
            warn!("{} of {} tool calls failed for {}", failed, results.len(), intent.destination);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared_types_rs::{
        Attraction, AttractionsPayload, Coordinates, DailyForecast, GeocodingPayload, ToolOutcome, WeatherPayload,
        WeatherSource,
    };
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Tool double returning a canned outcome after an optional delay
    struct FakeTool<Q> {
        name: ToolName,
        outcome: Result<ToolOutcome, ToolError>,
        delay: Duration,
        calls: AtomicUsize,
        _query: std::marker::PhantomData<fn(Q)>,
    }

    impl<Q> FakeTool<Q> {
        fn new(name: ToolName, outcome: Result<ToolOutcome, ToolError>) -> Arc<Self> {
            Self::slow(name, outcome, Duration::ZERO)
        }

        fn slow(name: ToolName, outcome: Result<ToolOutcome, ToolError>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome,
                delay,
                calls: AtomicUsize::new(0),
                _query: std::marker::PhantomData,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<Q: Send + Sync + 'static> Tool for FakeTool<Q> {
        type Query = Q;

        fn name(&self) -> ToolName {
            self.name
        }

        async fn lookup(&self, _query: &Q) -> Result<ToolOutcome, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        }
    }

    fn location() -> ToolOutcome {
        ToolOutcome::Geocoding(GeocodingPayload {
            place: "Barcelona".to_string(),
            country: Some("Spain".to_string()),
            coordinates: Coordinates {
                latitude: 41.39,
                longitude: 2.16,
            },
            timezone: None,
        })
    }

    fn forecast() -> ToolOutcome {
        ToolOutcome::Weather(WeatherPayload {
            location: "Barcelona".to_string(),
            source: WeatherSource::Forecast,
            days: vec![DailyForecast {
                date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
                temperature_max_c: Some(22.0),
                temperature_min_c: Some(15.0),
                precipitation_probability: Some(10),
                precipitation_mm: Some(0.0),
            }],
        })
    }

    fn sights() -> ToolOutcome {
        ToolOutcome::Attractions(AttractionsPayload {
            destination: "Barcelona".to_string(),
            attractions: vec![Attraction {
                name: "Sagrada Família".to_string(),
                category: "culture".to_string(),
                description: None,
            }],
        })
    }

    fn intent() -> TripIntent {
        TripIntent {
            origin: None,
            destination: "Barcelona".to_string(),
            start_date: None,
            duration_days: 4,
            budget: None,
            interests: BTreeSet::from(["culture".to_string()]),
            party_size: 1,
        }
    }

    fn decision(needs_attractions: bool) -> ToolDecision {
        ToolDecision {
            needs_weather: true,
            needs_attractions,
            attraction_categories: if needs_attractions { vec!["culture".to_string()] } else { vec![] },
            reasons: vec![],
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[tokio::test]
    async fn test_all_tools_succeed_in_fixed_order() {
        let manager = ToolManager::new(
            FakeTool::<GeocodingQuery>::new(ToolName::Geocoding, Ok(location())),
            FakeTool::<WeatherQuery>::new(ToolName::Weather, Ok(forecast())),
            FakeTool::<AttractionsQuery>::new(ToolName::Attractions, Ok(sights())),
            5,
            Duration::from_secs(1),
        );

        let results = manager.execute(&decision(true), &intent(), today()).await;
        let tools: Vec<ToolName> = results.iter().map(|r| r.tool).collect();
        assert_eq!(tools, vec![ToolName::Geocoding, ToolName::Weather, ToolName::Attractions]);
        assert!(results.iter().all(|r| !r.is_error()));
    }

    #[tokio::test]
    async fn test_geocoding_failure_skips_weather_but_not_attractions() {
        let weather = FakeTool::<WeatherQuery>::new(ToolName::Weather, Ok(forecast()));
        let attractions = FakeTool::<AttractionsQuery>::new(ToolName::Attractions, Ok(sights()));
        let manager = ToolManager::new(
            FakeTool::<GeocodingQuery>::new(
                ToolName::Geocoding,
                Err(ToolError::new(ToolErrorKind::Rejected, "400 bad request")),
            ),
            weather.clone(),
            attractions.clone(),
            5,
            Duration::from_secs(1),
        );

        let results = manager.execute(&decision(true), &intent(), today()).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].outcome_label(), "rejected");
        assert_eq!(results[1].tool, ToolName::Weather);
        assert_eq!(results[1].outcome_label(), "dependency_failed");
        assert!(results[1].error_message().unwrap().contains("400 bad request"));
        assert!(results[2].attractions().is_some());
        assert_eq!(weather.calls(), 0);
        assert_eq!(attractions.calls(), 1);
    }

    #[tokio::test]
    async fn test_attractions_skipped_when_not_decided() {
        let attractions = FakeTool::<AttractionsQuery>::new(ToolName::Attractions, Ok(sights()));
        let manager = ToolManager::new(
            FakeTool::<GeocodingQuery>::new(ToolName::Geocoding, Ok(location())),
            FakeTool::<WeatherQuery>::new(ToolName::Weather, Ok(forecast())),
            attractions.clone(),
            5,
            Duration::from_secs(1),
        );

        let results = manager.execute(&decision(false), &intent(), today()).await;
        assert_eq!(results.len(), 2);
        assert_eq!(attractions.calls(), 0);
    }

    #[tokio::test]
    async fn test_hung_tool_is_cut_off() {
        let manager = ToolManager::new(
            FakeTool::<GeocodingQuery>::new(ToolName::Geocoding, Ok(location())),
            FakeTool::<WeatherQuery>::slow(ToolName::Weather, Ok(forecast()), Duration::from_secs(10)),
            FakeTool::<AttractionsQuery>::new(ToolName::Attractions, Ok(sights())),
            5,
            Duration::from_millis(50),
        );

        let results = manager.execute(&decision(true), &intent(), today()).await;
        assert_eq!(results[1].tool, ToolName::Weather);
        assert_eq!(results[1].outcome_label(), "timeout");
        assert!(results[2].attractions().is_some());
    }

    #[tokio::test]
    async fn test_dropped_execution_leaves_finished_calls_in_log() {
        let manager = ToolManager::new(
            FakeTool::<GeocodingQuery>::new(ToolName::Geocoding, Ok(location())),
            FakeTool::<WeatherQuery>::new(ToolName::Weather, Ok(forecast())),
            FakeTool::<AttractionsQuery>::slow(ToolName::Attractions, Ok(sights()), Duration::from_secs(10)),
            5,
            Duration::from_secs(30),
        );
        let log = ToolLog::new();

        let cut_off = tokio::time::timeout(
            Duration::from_millis(100),
            manager.execute_logged(&decision(true), &intent(), today(), &log),
        )
        .await;
        assert!(cut_off.is_err());

        assert_eq!(log.pending(), vec![ToolName::Attractions]);
        let results = log.close(ToolErrorKind::Timeout, "request deadline exceeded");
        let labels: Vec<(ToolName, &str)> = results.iter().map(|r| (r.tool, r.outcome_label())).collect();
        assert_eq!(
            labels,
            vec![
                (ToolName::Geocoding, "ok"),
                (ToolName::Weather, "ok"),
                (ToolName::Attractions, "timeout"),
            ]
        );
    }

    #[tokio::test]
    async fn test_log_matches_returned_results() {
        let manager = ToolManager::new(
            FakeTool::<GeocodingQuery>::new(
                ToolName::Geocoding,
                Err(ToolError::new(ToolErrorKind::NotFound, "no such place")),
            ),
            FakeTool::<WeatherQuery>::new(ToolName::Weather, Ok(forecast())),
            FakeTool::<AttractionsQuery>::new(ToolName::Attractions, Ok(sights())),
            5,
            Duration::from_secs(1),
        );
        let log = ToolLog::new();

        let results = manager.execute_logged(&decision(true), &intent(), today(), &log).await;
        assert!(log.pending().is_empty());
        assert_eq!(log.results(), results);
    }

    #[test]
    fn test_from_default_config() {
        assert!(ToolManager::from_config(&ToolsConfig::default()).is_ok());
    }
}
