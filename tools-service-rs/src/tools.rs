//! Tool Implementations
//!
//! Lookup tools consulted by the planner:
//! - geocoding (Open-Meteo place search)
//! - weather (Open-Meteo forecast, or last year's observations for trips
//!   beyond the forecast horizon)
//! - attractions (Wikipedia search per interest category)
//!
//! Every tool turns one query into exactly one `ToolResult`; failures are
//! results, not errors.

use std::collections::HashSet;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{Days, Months, NaiveDate};
use futures::future::join_all;
use log::{debug, warn};
use shared_types_rs::{
    Attraction, AttractionsPayload, Coordinates, DailyForecast, GeocodingPayload, ToolName, ToolOutcome,
    ToolResult, WeatherPayload, WeatherSource,
};
use tool_sdk::open_meteo::{ArchiveParams, DailyWeatherResponse, ForecastParams, OpenMeteoClient, MAX_FORECAST_DAYS};
use tool_sdk::wikipedia::{strip_markup, WikipediaClient};

use crate::error::ToolError;

/// Days the archive lags behind today
const ARCHIVE_LAG_DAYS: u64 = 5;

/// A lookup tool
#[async_trait]
pub trait Tool: Send + Sync {
    type Query: Send + Sync;

    fn name(&self) -> ToolName;

    /// Perform the lookup
    async fn lookup(&self, query: &Self::Query) -> Result<ToolOutcome, ToolError>;

    /// Perform the lookup and record it as a `ToolResult`
    async fn fetch(&self, query: &Self::Query) -> ToolResult {
        let start = Instant::now();
        let outcome = match self.lookup(query).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("Tool {} failed: {}", self.name(), err);
                ToolOutcome::Error {
                    error: err.kind,
                    message: err.message,
                }
            }
        };

        ToolResult {
            tool: self.name(),
            latency_ms: start.elapsed().as_millis() as u64,
            outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodingQuery {
    pub place: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub location: GeocodingPayload,
    pub start_date: Option<NaiveDate>,
    pub duration_days: u32,
    /// Day the request was received; decides forecast vs seasonal data
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttractionsQuery {
    pub destination: String,
    pub categories: Vec<String>,
    pub per_category: u32,
}

/// Geocoding over Open-Meteo place search
#[derive(Debug, Clone)]
pub struct GeocodingTool {
    client: OpenMeteoClient,
}

impl GeocodingTool {
    pub fn new(client: OpenMeteoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GeocodingTool {
    type Query = GeocodingQuery;

    fn name(&self) -> ToolName {
        ToolName::Geocoding
    }

    async fn lookup(&self, query: &GeocodingQuery) -> Result<ToolOutcome, ToolError> {
        let response = self.client.search(&query.place, 1).await?;
        let best = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::not_found(format!("no place named '{}'", query.place)))?;

        debug!("Geocoded '{}' to {} ({}, {})", query.place, best.name, best.latitude, best.longitude);

        Ok(ToolOutcome::Geocoding(GeocodingPayload {
            place: best.name,
            country: best.country,
            coordinates: Coordinates {
                latitude: best.latitude,
                longitude: best.longitude,
            },
            timezone: best.timezone,
        }))
    }
}

/// Date range to ask the weather service for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherWindow {
    /// The next `days` days from today
    Upcoming { days: u32 },
    /// Explicit dates inside the forecast horizon
    Forecast { start: NaiveDate, end: NaiveDate },
    /// Trip dates shifted back `years_back` years into the archive; used
    /// beyond the forecast horizon and for dates already past
    Seasonal {
        start: NaiveDate,
        end: NaiveDate,
        years_back: u32,
    },
}

/// Pick the weather window for a trip
pub fn weather_window(start_date: Option<NaiveDate>, duration_days: u32, today: NaiveDate) -> Option<WeatherWindow> {
    let duration = duration_days.max(1);
    let Some(start) = start_date else {
        return Some(WeatherWindow::Upcoming {
            days: duration.min(MAX_FORECAST_DAYS),
        });
    };

    let end = start.checked_add_days(Days::new(u64::from(duration - 1)))?;
    let horizon = today.checked_add_days(Days::new(u64::from(MAX_FORECAST_DAYS - 1)))?;

    // Dates already past have no forecast; they take the seasonal path too.
    if start >= today && start <= horizon {
        return Some(WeatherWindow::Forecast {
            start,
            end: end.min(horizon),
        });
    }

    let latest_archived = today.checked_sub_days(Days::new(ARCHIVE_LAG_DAYS))?;
    let mut years_back = 1;
    loop {
        let shift = Months::new(12 * years_back);
        let (past_start, past_end) = (start.checked_sub_months(shift)?, end.checked_sub_months(shift)?);
        if past_end <= latest_archived {
            return Some(WeatherWindow::Seasonal {
                start: past_start,
                end: past_end,
                years_back,
            });
        }
        years_back += 1;
    }
}

fn daily_forecasts(response: DailyWeatherResponse, years_forward: u32) -> Vec<DailyForecast> {
    let shift = Months::new(12 * years_forward);
    response
        .daily
        .map(|daily| daily.rows())
        .unwrap_or_default()
        .into_iter()
        .map(|row| DailyForecast {
            date: row.date.checked_add_months(shift).unwrap_or(row.date),
            temperature_max_c: row.temperature_max,
            temperature_min_c: row.temperature_min,
            precipitation_probability: row.precipitation_probability.map(|p| p.round().clamp(0.0, 100.0) as u8),
            precipitation_mm: row.precipitation_sum,
        })
        .collect()
}

/// Weather over the Open-Meteo forecast and archive endpoints
#[derive(Debug, Clone)]
pub struct WeatherTool {
    client: OpenMeteoClient,
}

impl WeatherTool {
    pub fn new(client: OpenMeteoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    type Query = WeatherQuery;

    fn name(&self) -> ToolName {
        ToolName::Weather
    }

    async fn lookup(&self, query: &WeatherQuery) -> Result<ToolOutcome, ToolError> {
        let Coordinates { latitude, longitude } = query.location.coordinates;
        let window = weather_window(query.start_date, query.duration_days, query.today)
            .ok_or_else(|| ToolError::invalid_response("trip dates are out of range"))?;
        debug!("Weather window for {}: {:?}", query.location.place, window);

        let (response, source, years_forward) = match window {
            WeatherWindow::Upcoming { days } => {
                let params = ForecastParams {
                    latitude,
                    longitude,
                    start_date: None,
                    end_date: None,
                    forecast_days: Some(days),
                };
                (self.client.forecast(&params).await?, WeatherSource::Forecast, 0)
            }
            WeatherWindow::Forecast { start, end } => {
                let params = ForecastParams {
                    latitude,
                    longitude,
                    start_date: Some(start),
                    end_date: Some(end),
                    forecast_days: None,
                };
                (self.client.forecast(&params).await?, WeatherSource::Forecast, 0)
            }
            WeatherWindow::Seasonal { start, end, years_back } => {
                let params = ArchiveParams {
                    latitude,
                    longitude,
                    start_date: start,
                    end_date: end,
                };
                (self.client.archive(&params).await?, WeatherSource::Seasonal, years_back)
            }
        };

        let days = daily_forecasts(response, years_forward);
        if days.is_empty() {
            return Err(ToolError::not_found(format!("no daily weather for {}", query.location.place)));
        }

        Ok(ToolOutcome::Weather(WeatherPayload {
            location: query.location.place.clone(),
            source,
            days,
        }))
    }
}

/// Attractions over Wikipedia search, one search per category
#[derive(Debug, Clone)]
pub struct AttractionsTool {
    client: WikipediaClient,
}

impl AttractionsTool {
    pub fn new(client: WikipediaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for AttractionsTool {
    type Query = AttractionsQuery;

    fn name(&self) -> ToolName {
        ToolName::Attractions
    }

    async fn lookup(&self, query: &AttractionsQuery) -> Result<ToolOutcome, ToolError> {
        let searches = query.categories.iter().map(|category| async move {
            let text = format!("{} in {}", category, query.destination);
            (category, self.client.search(&text, query.per_category).await)
        });

        let mut attractions = Vec::new();
        let mut seen = HashSet::new();
        let mut first_error = None;

        for (category, result) in join_all(searches).await {
            match result {
                Ok(hits) => {
                    for hit in hits {
                        if seen.insert(hit.title.clone()) {
                            let description = strip_markup(&hit.snippet);
                            attractions.push(Attraction {
                                name: hit.title,
                                category: category.clone(),
                                description: (!description.is_empty()).then_some(description),
                            });
                        }
                    }
                }
                Err(err) => {
                    warn!("Attractions search for '{}' failed: {}", category, err);
                    first_error.get_or_insert(err);
                }
            }
        }

        if attractions.is_empty() {
            return Err(match first_error {
                Some(err) => err.into(),
                None => ToolError::not_found(format!("no attractions found for {}", query.destination)),
            });
        }

        Ok(ToolOutcome::Attractions(AttractionsPayload {
            destination: query.destination.clone(),
            attractions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types_rs::ToolErrorKind;
    use tool_sdk::{OpenMeteoConfig, WikipediaConfig};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn open_meteo(server: &MockServer) -> OpenMeteoClient {
        let uri = server.uri();
        OpenMeteoClient::new(OpenMeteoConfig {
            geocoding_url: format!("{}/v1", uri),
            forecast_url: format!("{}/v1", uri),
            archive_url: format!("{}/archive/v1", uri),
            timeout_seconds: 2,
            max_retries: 1,
            language: "en".to_string(),
        })
        .unwrap()
    }

    fn barcelona() -> GeocodingPayload {
        GeocodingPayload {
            place: "Barcelona".to_string(),
            country: Some("Spain".to_string()),
            coordinates: Coordinates {
                latitude: 41.39,
                longitude: 2.16,
            },
            timezone: Some("Europe/Madrid".to_string()),
        }
    }

    #[test]
    fn test_weather_windows() {
        let today = date(2026, 10, 17);

        assert_eq!(weather_window(None, 4, today), Some(WeatherWindow::Upcoming { days: 4 }));
        assert_eq!(weather_window(None, 30, today), Some(WeatherWindow::Upcoming { days: 16 }));
        assert_eq!(
            weather_window(Some(date(2026, 10, 20)), 4, today),
            Some(WeatherWindow::Forecast {
                start: date(2026, 10, 20),
                end: date(2026, 10, 23)
            })
        );
        // Clipped at the last forecast day
        assert_eq!(
            weather_window(Some(date(2026, 10, 30)), 7, today),
            Some(WeatherWindow::Forecast {
                start: date(2026, 10, 30),
                end: date(2026, 11, 1)
            })
        );
        assert_eq!(
            weather_window(Some(date(2027, 5, 1)), 4, today),
            Some(WeatherWindow::Seasonal {
                start: date(2026, 5, 1),
                end: date(2026, 5, 4),
                years_back: 1
            })
        );
        // Same dates last year are not archived yet
        assert_eq!(
            weather_window(Some(date(2027, 10, 15)), 3, today),
            Some(WeatherWindow::Seasonal {
                start: date(2025, 10, 15),
                end: date(2025, 10, 17),
                years_back: 2
            })
        );
    }

    #[test]
    fn test_past_dates_are_not_forecast() {
        let today = date(2026, 10, 17);

        assert_eq!(
            weather_window(Some(date(2026, 3, 10)), 3, today),
            Some(WeatherWindow::Seasonal {
                start: date(2025, 3, 10),
                end: date(2025, 3, 12),
                years_back: 1
            })
        );
        // A trip already under way is treated the same way
        assert_eq!(
            weather_window(Some(date(2026, 10, 15)), 4, today),
            Some(WeatherWindow::Seasonal {
                start: date(2025, 10, 15),
                end: date(2025, 10, 18),
                years_back: 1
            })
        );
        assert!(matches!(
            weather_window(Some(today), 2, today),
            Some(WeatherWindow::Forecast { .. })
        ));
    }

    #[tokio::test]
    async fn test_geocoding_first_hit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Barcelona"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"name": "Barcelona", "latitude": 41.39, "longitude": 2.16, "country": "Spain", "timezone": "Europe/Madrid"},
                    {"name": "Barcelona", "latitude": 10.13, "longitude": -64.7, "country": "Venezuela"}
                ]
            })))
            .mount(&server)
            .await;

        let result = GeocodingTool::new(open_meteo(&server))
            .fetch(&GeocodingQuery {
                place: "Barcelona".to_string(),
            })
            .await;

        assert_eq!(result.tool, ToolName::Geocoding);
        assert_eq!(result.geocoding(), Some(&barcelona()));
    }

    #[tokio::test]
    async fn test_geocoding_without_results_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generationtime_ms": 0.3})))
            .mount(&server)
            .await;

        let result = GeocodingTool::new(open_meteo(&server))
            .fetch(&GeocodingQuery {
                place: "Atlantis".to_string(),
            })
            .await;

        assert_eq!(result.outcome_label(), ToolErrorKind::NotFound.as_str());
    }

    #[tokio::test]
    async fn test_seasonal_weather_is_shifted_to_trip_dates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archive/v1/archive"))
            .and(query_param("start_date", "2026-05-01"))
            .and(query_param("end_date", "2026-05-02"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "latitude": 41.39,
                "longitude": 2.16,
                "daily": {
                    "time": ["2026-05-01", "2026-05-02"],
                    "temperature_2m_max": [21.4, 19.0],
                    "temperature_2m_min": [13.1, 12.2],
                    "precipitation_sum": [0.0, 3.2]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = WeatherTool::new(open_meteo(&server))
            .fetch(&WeatherQuery {
                location: barcelona(),
                start_date: Some(date(2027, 5, 1)),
                duration_days: 2,
                today: date(2026, 10, 17),
            })
            .await;

        let weather = result.weather().unwrap();
        assert_eq!(weather.source, WeatherSource::Seasonal);
        assert_eq!(weather.days[0].date, date(2027, 5, 1));
        assert_eq!(weather.days[1].precipitation_mm, Some(3.2));
        assert_eq!(weather.days[1].precipitation_probability, None);
    }

    #[tokio::test]
    async fn test_forecast_client_error_is_rejected_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": true,
                "reason": "Latitude must be in range of -90 to 90°"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = WeatherTool::new(open_meteo(&server))
            .fetch(&WeatherQuery {
                location: barcelona(),
                start_date: None,
                duration_days: 3,
                today: date(2026, 10, 17),
            })
            .await;

        assert!(result.is_error());
        assert_eq!(result.outcome_label(), "rejected");
        assert!(result.error_message().unwrap().contains("Latitude"));
    }

    #[tokio::test]
    async fn test_forecast_server_error_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let result = WeatherTool::new(open_meteo(&server))
            .fetch(&WeatherQuery {
                location: barcelona(),
                start_date: None,
                duration_days: 3,
                today: date(2026, 10, 17),
            })
            .await;

        assert_eq!(result.outcome_label(), "unavailable");
    }

    #[tokio::test]
    async fn test_attractions_per_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("srsearch", "culture in Barcelona"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"search": [
                    {"title": "Sagrada Família", "pageid": 1, "snippet": "Basilica by <span class=\"searchmatch\">Gaudí</span>"},
                    {"title": "Park Güell", "pageid": 2, "snippet": ""}
                ]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("srsearch", "food in Barcelona"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = WikipediaClient::new(WikipediaConfig {
            base_url: format!("{}/w", server.uri()),
            timeout_seconds: 2,
            max_retries: 0,
        })
        .unwrap();

        let result = AttractionsTool::new(client)
            .fetch(&AttractionsQuery {
                destination: "Barcelona".to_string(),
                categories: vec!["culture".to_string(), "food".to_string()],
                per_category: 5,
            })
            .await;

        let payload = result.attractions().unwrap();
        assert_eq!(payload.attractions.len(), 2);
        assert_eq!(payload.attractions[0].category, "culture");
        assert_eq!(payload.attractions[0].description.as_deref(), Some("Basilica by Gaudí"));
        assert_eq!(payload.attractions[1].description, None);
    }
}
