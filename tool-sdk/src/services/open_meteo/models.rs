//! Open-Meteo data models
//!
//! Request parameter structs and the subset of the geocoding, forecast and
//! archive responses the planner reads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily variables requested from the forecast endpoint
pub const FORECAST_DAILY: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_probability_max,precipitation_sum";

/// The archive has no precipitation probability
pub const ARCHIVE_DAILY: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum";

/// Forecast horizon of the public API, in days
pub const MAX_FORECAST_DAYS: u32 = 16;

/// Parameters that render into a query string
pub trait QueryParams {
    fn to_query_params(&self) -> Vec<(String, String)>;
}

/// Place-name search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingParams {
    pub name: String,
    pub count: u32,
    pub language: String,
}

impl QueryParams for GeocodingParams {
    fn to_query_params(&self) -> Vec<(String, String)> {
        vec![
            ("name".to_string(), self.name.clone()),
            ("count".to_string(), self.count.to_string()),
            ("language".to_string(), self.language.clone()),
            ("format".to_string(), "json".to_string()),
        ]
    }
}

/// Daily forecast, either for explicit dates or for the next `forecast_days`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastParams {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub forecast_days: Option<u32>,
}

impl QueryParams for ForecastParams {
    fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("latitude".to_string(), self.latitude.to_string()),
            ("longitude".to_string(), self.longitude.to_string()),
            ("daily".to_string(), FORECAST_DAILY.to_string()),
            ("timezone".to_string(), "auto".to_string()),
        ];

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            params.push(("start_date".to_string(), start.to_string()));
            params.push(("end_date".to_string(), end.to_string()));
        } else if let Some(days) = self.forecast_days {
            params.push(("forecast_days".to_string(), days.min(MAX_FORECAST_DAYS).to_string()));
        }

        params
    }
}

/// Observed daily weather for a past date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveParams {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl QueryParams for ArchiveParams {
    fn to_query_params(&self) -> Vec<(String, String)> {
        vec![
            ("latitude".to_string(), self.latitude.to_string()),
            ("longitude".to_string(), self.longitude.to_string()),
            ("start_date".to_string(), self.start_date.to_string()),
            ("end_date".to_string(), self.end_date.to_string()),
            ("daily".to_string(), ARCHIVE_DAILY.to_string()),
            ("timezone".to_string(), "auto".to_string()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingResponse {
    /// Absent when nothing matched
    #[serde(default)]
    pub results: Vec<GeocodingResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingResult {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub population: Option<u64>,
}

/// Shared shape of forecast and archive responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyWeatherResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub daily: Option<DailySeries>,
}

/// Column-oriented daily values; every vector is indexed like `time`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailySeries {
    pub time: Vec<NaiveDate>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

/// One day pulled out of a `DailySeries`
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub precipitation_sum: Option<f64>,
}

impl DailySeries {
    /// Transpose the columns into rows; short columns yield `None`
    pub fn rows(&self) -> Vec<DailyRow> {
        fn at(column: &[Option<f64>], index: usize) -> Option<f64> {
            column.get(index).copied().flatten()
        }

        self.time
            .iter()
            .enumerate()
            .map(|(i, date)| DailyRow {
                date: *date,
                temperature_max: at(&self.temperature_2m_max, i),
                temperature_min: at(&self.temperature_2m_min, i),
                precipitation_probability: at(&self.precipitation_probability_max, i),
                precipitation_sum: at(&self.precipitation_sum, i),
            })
            .collect()
    }
}
