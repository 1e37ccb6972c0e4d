//! Wikipedia client implementation
//!
//! Full-text search through the MediaWiki action API. Used to find
//! points of interest for a destination.

mod models;
pub use models::*;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

use crate::config::{ServiceConfig, WikipediaConfig};
use crate::core::{endpoint_url, ServiceClient};
use crate::error::{ErrorContext, Result, ServiceError};
use crate::resilience::Resilience;
use crate::services::common::{build_http_client, decode_response, UserAgent};

const API_ENDPOINT: &str = "api.php";

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Strip HTML tags and the common entities from a search snippet
pub fn strip_markup(snippet: &str) -> String {
    let text = TAG_RE.replace_all(snippet, "");
    let text = text
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    SPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Wikipedia client
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    http_client: Client,
    config: WikipediaConfig,
    resilience: Resilience,
}

impl WikipediaClient {
    pub fn new(config: WikipediaConfig) -> Result<Self> {
        config.validate()?;

        let http_client = build_http_client(Some(UserAgent::for_client("wikipedia-client")), Some(config.timeout()))?;
        let resilience = Resilience::new(config.retry_config(), config.timeout());

        Ok(Self {
            http_client,
            config,
            resilience,
        })
    }

    /// Search articles; returns hits in relevance order
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchHit>> {
        let params = SearchParams {
            query: query.to_string(),
            limit,
        }
        .to_query_params();
        let url = endpoint_url(&self.config.base_url, API_ENDPOINT);
        let (url, params) = (url.as_str(), params.as_slice());

        let response = self
            .resilience
            .execute(self.name(), move || self.search_once(url, params))
            .await?;

        if let Some(error) = response.error {
            return Err(ServiceError::validation(format!("{}: {}", error.code, error.info))
                .with_context(ErrorContext::for_service(self.name()).endpoint(API_ENDPOINT)));
        }

        Ok(response.query.map(|q| q.search).unwrap_or_default())
    }

    async fn search_once(&self, url: &str, params: &[(String, String)]) -> Result<SearchResponse> {
        debug!("Sending request to Wikipedia: GET {}", url);

        let response = self.http_client.get(url).query(params).send().await.map_err(|e| {
            ServiceError::from(e).with_context(ErrorContext::for_service(self.name()).endpoint(API_ENDPOINT))
        })?;

        decode_response(self.name(), API_ENDPOINT, response).await
    }
}

impl ServiceClient for WikipediaClient {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup() {
        let snippet = r#"The <span class="searchmatch">Sagrada</span> Fam&iacute;lia &amp; the   &quot;Park&quot;"#;
        assert_eq!(strip_markup(snippet), "The Sagrada Fam&iacute;lia & the \"Park\"");
    }
}
