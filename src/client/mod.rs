//! HTTP clients for the upstream search and messaging providers.
//!
//! Both clients are synchronous (`ureq`) and are used from async contexts via
//! `tokio::task::spawn_blocking` through the wrappers in [`async_wrapper`].

mod async_wrapper;
mod twilio;

pub use async_wrapper::{MessageSender, SearchProvider, SerpApiProvider, TwilioSender};
pub use twilio::TwilioClient;

use crate::config::Config;
use crate::error::{SearchApiError, SearchApiResult};
use crate::metrics::Metrics;
use crate::models::{ProviderQuery, RawSearchHit, SearchEngine};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Response envelope of the provider's search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,

    /// Set instead of results when the provider rejects the query
    #[serde(default)]
    error: Option<String>,
}

/// One entry of `organic_results`.
#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,

    #[serde(default)]
    link: Option<String>,

    #[serde(default)]
    snippet: String,

    #[serde(default)]
    position: Option<u32>,
}

/// HTTP client for the SerpAPI search endpoint.
///
/// This client uses `ureq` for synchronous HTTP requests and can be called
/// from async contexts using `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct SerpApiClient {
    /// Base URL for the provider
    base_url: String,

    /// API key sent with every query
    api_key: String,

    /// Location used when a query carries none
    default_location: String,

    /// HTTP client agent
    agent: Arc<ureq::Agent>,

    /// Metrics collector
    metrics: Metrics,
}

impl SerpApiClient {
    /// Create a new client from configuration.
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout))
            .build();

        Self {
            base_url: config.serpapi_url.clone(),
            api_key: config.serpapi_key.clone(),
            default_location: config.default_location.clone(),
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Create a client with a custom base URL (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();

        Self {
            base_url,
            api_key,
            default_location: Config::default().default_location,
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Record into a shared collector instead of a private one.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Get a reference to the metrics collector.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Query string parameters for one page of one engine.
    fn query_params(&self, query: &ProviderQuery) -> Vec<(&'static str, String)> {
        let engine = query.engine;
        let mut params = vec![
            ("engine", engine.as_str().to_string()),
            ("api_key", self.api_key.clone()),
            (engine.query_param(), query.query.clone()),
        ];

        if engine.supports_location() {
            let location = query
                .location
                .clone()
                .unwrap_or_else(|| self.default_location.clone());
            params.push(("location", location));
        }

        if engine == SearchEngine::Google {
            params.push(("google_domain", "google.com".to_string()));
            params.push(("gl", "us".to_string()));
            params.push(("hl", "en".to_string()));
        }

        if let Some(param) = engine.page_size_param() {
            params.push((param, query.page_size.to_string()));
        }

        if let Some(param) = engine.offset_param() {
            if query.offset > 0 {
                params.push((param, query.offset.to_string()));
            }
        }

        params
    }

    /// Build the full request URL for a query.
    fn build_url(&self, query: &ProviderQuery) -> String {
        let base = self.base_url.trim_end_matches('/');
        let params = self
            .query_params(query)
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}/search.json?{}", base, params)
    }

    /// Execute a GET request.
    fn get(&self, url: &str) -> Result<ureq::Response, SearchApiError> {
        let start = Instant::now();

        let result = self
            .agent
            .get(url)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| self.map_error(e));

        let duration = start.elapsed();
        if result.is_err() {
            self.metrics.record_http_error();
        }
        self.metrics.record_http_request(duration);

        result
    }

    /// Map a ureq error to a SearchApiError.
    fn map_error(&self, error: ureq::Error) -> SearchApiError {
        match error {
            ureq::Error::Status(code, response) => {
                let body = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());

                match code {
                    401 => SearchApiError::Unauthorized,
                    429 => SearchApiError::RateLimitExceeded,
                    _ => SearchApiError::ApiError {
                        status: code,
                        message: provider_message(&body),
                    },
                }
            }
            ureq::Error::Transport(transport) => {
                if transport.kind() == ureq::ErrorKind::ConnectionFailed {
                    SearchApiError::HttpError("Connection failed".to_string())
                } else if transport.kind() == ureq::ErrorKind::Io {
                    SearchApiError::Timeout
                } else {
                    SearchApiError::HttpError(transport.to_string())
                }
            }
        }
    }

    /// Fetch one page of results for one engine.
    ///
    /// Entries without a link are skipped. A missing rank falls back to the
    /// entry's place in the overall result list.
    pub fn search(&self, query: &ProviderQuery) -> SearchApiResult<Vec<RawSearchHit>> {
        tracing::debug!(
            engine = %query.engine,
            offset = query.offset,
            query = %query.query,
            "Querying search provider"
        );

        let response = self.get(&self.build_url(query))?;
        let body = response
            .into_string()
            .map_err(|e| SearchApiError::HttpError(e.to_string()))?;

        let hits = parse_search_response(&body, query)?;
        tracing::debug!(engine = %query.engine, count = hits.len(), "Provider page received");
        Ok(hits)
    }
}

/// Normalize a provider response body into hits for `query.engine`.
fn parse_search_response(body: &str, query: &ProviderQuery) -> SearchApiResult<Vec<RawSearchHit>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_object() {
        return Err(SearchApiError::MalformedPayload(
            "Expected a JSON object".to_string(),
        ));
    }

    let response: SearchResponse = serde_json::from_value(value)?;
    if let Some(message) = response.error {
        return Err(SearchApiError::ApiError {
            status: 200,
            message,
        });
    }

    let hits = response
        .organic_results
        .into_iter()
        .enumerate()
        .filter_map(|(index, result)| {
            let link = result.link.filter(|l| !l.trim().is_empty())?;
            Some(RawSearchHit {
                title: result.title,
                link,
                snippet: result.snippet,
                source: query.engine,
                position: result
                    .position
                    .unwrap_or((query.offset + index + 1) as u32),
            })
        })
        .collect();

    Ok(hits)
}

/// Pull the provider's `error` text out of an error body, if present.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(engine: SearchEngine, offset: usize) -> ProviderQuery {
        ProviderQuery {
            engine,
            query: "plumbers & heating".to_string(),
            location: None,
            page_size: 100,
            offset,
        }
    }

    fn client() -> SerpApiClient {
        SerpApiClient::with_base_url("https://serp.example.com/".to_string(), "k".to_string())
    }

    #[test]
    fn test_build_url_google() {
        let url = client().build_url(&query(SearchEngine::Google, 0));
        assert!(url.starts_with("https://serp.example.com/search.json?engine=google&api_key=k"));
        assert!(url.contains("&q=plumbers%20%26%20heating"));
        assert!(url.contains("&location=United%20States"));
        assert!(url.contains("&google_domain=google.com&gl=us&hl=en"));
        assert!(url.contains("&num=100"));
        assert!(!url.contains("start="));
    }

    #[test]
    fn test_build_url_engine_specific_params() {
        let url = client().build_url(&query(SearchEngine::Yahoo, 10));
        assert!(url.contains("&p=plumbers"));
        assert!(url.contains("&b=10"));
        assert!(!url.contains("location="));

        let url = client().build_url(&query(SearchEngine::Bing, 100));
        assert!(url.contains("&count=100"));
        assert!(url.contains("&first=100"));

        let url = client().build_url(&query(SearchEngine::DuckDuckGo, 0));
        assert!(url.contains("engine=duckduckgo"));
        assert!(!url.contains("location="));
        assert!(!url.contains("num="));
    }

    #[test]
    fn test_parse_skips_missing_links_and_fills_position() {
        let body = r#"{
            "organic_results": [
                {"title": "A", "link": "https://a.example", "snippet": "x", "position": 1},
                {"title": "No link", "snippet": "y"},
                {"title": "C", "link": "https://c.example"}
            ]
        }"#;
        let hits = parse_search_response(body, &query(SearchEngine::Bing, 20)).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, 1);
        assert_eq!(hits[1].link, "https://c.example");
        assert_eq!(hits[1].position, 23);
        assert_eq!(hits[1].source, SearchEngine::Bing);
        assert_eq!(hits[1].snippet, "");
    }

    #[test]
    fn test_parse_missing_results_is_empty_page() {
        let hits = parse_search_response("{}", &query(SearchEngine::Google, 0)).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_parse_error_field() {
        let err = parse_search_response(
            r#"{"error": "Invalid API key."}"#,
            &query(SearchEngine::Google, 0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SearchApiError::ApiError { ref message, .. } if message == "Invalid API key."
        ));
    }

    #[test]
    fn test_parse_malformed_payload() {
        let err = parse_search_response("[1, 2]", &query(SearchEngine::Google, 0)).unwrap_err();
        assert!(matches!(err, SearchApiError::MalformedPayload(_)));

        let err = parse_search_response("not json", &query(SearchEngine::Google, 0)).unwrap_err();
        assert!(matches!(err, SearchApiError::JsonError(_)));
    }

    #[test]
    fn test_provider_message() {
        assert_eq!(provider_message(r#"{"error": "Bad engine"}"#), "Bad engine");
        assert_eq!(provider_message("Gateway timeout"), "Gateway timeout");
    }

    #[test]
    fn test_client_creation() {
        let config = Config {
            serpapi_url: "https://serpapi.com".to_string(),
            serpapi_key: "test-key-123".to_string(),
            default_location: "Austin, TX".to_string(),
            ..Config::default()
        };

        let client = SerpApiClient::new(&config);
        assert_eq!(client.base_url, "https://serpapi.com");
        assert_eq!(client.api_key, "test-key-123");
        assert_eq!(client.default_location, "Austin, TX");
    }
}
