//! Open-Meteo client implementation
//!
//! Covers the three keyless endpoints the planner uses: place search,
//! daily forecast, and the historical archive (for trips beyond the
//! forecast horizon).

mod models;
pub use models::*;

use std::time::Instant;

use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::{OpenMeteoConfig, ServiceConfig};
use crate::core::{endpoint_url, ServiceClient};
use crate::error::{ErrorContext, Result, ServiceError};
use crate::resilience::Resilience;
use crate::services::common::{build_http_client, decode_response, UserAgent};

/// Open-Meteo client
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http_client: Client,
    config: OpenMeteoConfig,
    resilience: Resilience,
}

impl OpenMeteoClient {
    pub fn new(config: OpenMeteoConfig) -> Result<Self> {
        config.validate()?;

        let http_client = build_http_client(Some(UserAgent::for_client("open-meteo-client")), Some(config.timeout()))?;
        let resilience = Resilience::new(config.retry_config(), config.timeout());

        Ok(Self {
            http_client,
            config,
            resilience,
        })
    }

    /// Search places by name, best match first
    pub async fn search(&self, name: &str, count: u32) -> Result<GeocodingResponse> {
        let params = GeocodingParams {
            name: name.to_string(),
            count,
            language: self.config.language.clone(),
        };
        self.get(&self.config.geocoding_url, "search", &params).await
    }

    /// Daily forecast
    pub async fn forecast(&self, params: &ForecastParams) -> Result<DailyWeatherResponse> {
        self.get(&self.config.forecast_url, "forecast", params).await
    }

    /// Observed daily weather for a past range
    pub async fn archive(&self, params: &ArchiveParams) -> Result<DailyWeatherResponse> {
        self.get(&self.config.archive_url, "archive", params).await
    }

    async fn get<P, R>(&self, base_url: &str, endpoint: &str, params: &P) -> Result<R>
    where
        P: QueryParams,
        R: DeserializeOwned,
    {
        let url = endpoint_url(base_url, endpoint);
        let query = params.to_query_params();
        let (url, query) = (url.as_str(), query.as_slice());

        let start_time = Instant::now();
        let result = self
            .resilience
            .execute(self.name(), move || self.get_once(url, endpoint, query))
            .await;
        debug!("Open-Meteo GET {} finished in {:?}", url, start_time.elapsed());

        result
    }

    async fn get_once<R>(&self, url: &str, endpoint: &str, query: &[(String, String)]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        debug!("Sending request to Open-Meteo: GET {}", url);

        let response = self.http_client.get(url).query(query).send().await.map_err(|e| {
            ServiceError::from(e).with_context(ErrorContext::for_service(self.name()).endpoint(endpoint))
        })?;

        decode_response(self.name(), endpoint, response).await
    }
}

impl ServiceClient for OpenMeteoClient {
    fn name(&self) -> &str {
        "open-meteo"
    }

    fn base_url(&self) -> &str {
        &self.config.forecast_url
    }
}
