//! MediaWiki search API data models

use serde::{Deserialize, Serialize};

/// Full-text search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub limit: u32,
}

impl SearchParams {
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        vec![
            ("action".to_string(), "query".to_string()),
            ("list".to_string(), "search".to_string()),
            ("srsearch".to_string(), self.query.clone()),
            ("srlimit".to_string(), self.limit.to_string()),
            ("format".to_string(), "json".to_string()),
            ("utf8".to_string(), "1".to_string()),
        ]
    }
}

/// MediaWiki reports most errors with HTTP 200 and an `error` object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: Option<SearchQuery>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    #[serde(default)]
    pub pageid: Option<u64>,
    /// HTML fragment with `<span class="searchmatch">` highlights
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    #[serde(default)]
    pub info: String,
}
