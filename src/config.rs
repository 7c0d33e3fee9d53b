//! Configuration management for the lead stream service.
//!
//! This module handles loading and validating configuration from environment variables.
//! Every credential and tunable lives here and is handed to collaborators explicitly;
//! nothing else in the crate reads the environment.

use crate::error::{ConfigError, ConfigResult};
use crate::models::SearchEngine;
use std::env;

/// Upper bound for a caller-supplied result cap.
pub const MAX_RESULT_CAP: usize = 1000;

/// Configuration for the lead stream service.
#[derive(Debug, Clone)]
pub struct Config {
    /// SerpAPI base URL
    pub serpapi_url: String,

    /// SerpAPI key
    pub serpapi_key: String,

    /// Messaging provider base URL
    pub twilio_api_url: String,

    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// HTTP request timeout in seconds (default: 30)
    pub request_timeout: u64,

    /// Results requested per provider call (default: 100)
    pub page_size: usize,

    /// Default per-stream result cap (default: 100)
    pub max_results: usize,

    /// Pages fetched per engine (default: 1)
    pub max_pages: usize,

    /// Location used when a request omits one
    pub default_location: String,

    /// Engine used when a request omits `engines`
    pub default_engine: SearchEngine,

    /// Qualifying results between progress events (default: 5)
    pub progress_interval: usize,

    /// Outbound channel capacity in frames (default: 32)
    pub stream_buffer: usize,

    /// User reported by the static identity provider
    pub default_user_id: String,

    /// Log level (default: "info")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `SERPAPI_KEY`: API key for the search provider
    ///
    /// Optional environment variables:
    /// - `SERPAPI_BASE_URL`: Search provider URL (default: `https://serpapi.com`)
    /// - `TWILIO_API_URL`: Messaging provider URL (default: `https://api.twilio.com`)
    /// - `BIND_ADDR`: Listen address (default: `127.0.0.1:3000`)
    /// - `REQUEST_TIMEOUT`: HTTP timeout in seconds (default: 30)
    /// - `SEARCH_PAGE_SIZE`: Results per provider call, 1-100 (default: 100)
    /// - `SEARCH_MAX_RESULTS`: Default result cap per stream (default: 100)
    /// - `SEARCH_MAX_PAGES`: Pages per engine (default: 1)
    /// - `SEARCH_DEFAULT_LOCATION`: Default location (default: "United States")
    /// - `SEARCH_DEFAULT_ENGINE`: Default engine (default: "google")
    /// - `PROGRESS_INTERVAL`: Leads between progress events (default: 5)
    /// - `STREAM_BUFFER`: Outbound channel capacity (default: 32)
    /// - `DEFAULT_USER_ID`: Static identity (default: "local")
    /// - `LOG_LEVEL`: Logging level (default: "info")
    pub fn from_env() -> ConfigResult<Self> {
        // Try to load .env file if it exists (but don't fail if it doesn't)
        let _ = dotenvy::dotenv();

        let serpapi_key = env::var("SERPAPI_KEY")
            .map_err(|_| ConfigError::MissingVar("SERPAPI_KEY".to_string()))?;

        if serpapi_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "SERPAPI_KEY".to_string(),
                reason: "Cannot be empty".to_string(),
            });
        }

        let defaults = Config::default();

        let serpapi_url = Self::parse_env_url("SERPAPI_BASE_URL", &defaults.serpapi_url)?;
        let twilio_api_url = Self::parse_env_url("TWILIO_API_URL", &defaults.twilio_api_url)?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let request_timeout = Self::parse_env_u64("REQUEST_TIMEOUT", defaults.request_timeout)?;
        let page_size = Self::parse_env_usize("SEARCH_PAGE_SIZE", defaults.page_size)?;
        let max_results = Self::parse_env_usize("SEARCH_MAX_RESULTS", defaults.max_results)?;
        let max_pages = Self::parse_env_usize("SEARCH_MAX_PAGES", defaults.max_pages)?;
        let progress_interval =
            Self::parse_env_usize("PROGRESS_INTERVAL", defaults.progress_interval)?;
        let stream_buffer = Self::parse_env_usize("STREAM_BUFFER", defaults.stream_buffer)?;

        if page_size == 0 || page_size > 100 {
            return Err(ConfigError::InvalidValue {
                var: "SEARCH_PAGE_SIZE".to_string(),
                reason: "Must be between 1 and 100".to_string(),
            });
        }

        if max_results == 0 || max_results > MAX_RESULT_CAP {
            return Err(ConfigError::InvalidValue {
                var: "SEARCH_MAX_RESULTS".to_string(),
                reason: format!("Must be between 1 and {}", MAX_RESULT_CAP),
            });
        }

        for (var, value) in [
            ("SEARCH_MAX_PAGES", max_pages),
            ("PROGRESS_INTERVAL", progress_interval),
            ("STREAM_BUFFER", stream_buffer),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    var: var.to_string(),
                    reason: "Must be greater than zero".to_string(),
                });
            }
        }

        let default_location =
            env::var("SEARCH_DEFAULT_LOCATION").unwrap_or(defaults.default_location);

        let default_engine = match env::var("SEARCH_DEFAULT_ENGINE") {
            Ok(val) => val.parse::<SearchEngine>().map_err(|_| ConfigError::InvalidValue {
                var: "SEARCH_DEFAULT_ENGINE".to_string(),
                reason: format!("Unknown engine: {}", val),
            })?,
            Err(_) => defaults.default_engine,
        };

        let default_user_id = env::var("DEFAULT_USER_ID").unwrap_or(defaults.default_user_id);
        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Config {
            serpapi_url,
            serpapi_key,
            twilio_api_url,
            bind_addr,
            request_timeout,
            page_size,
            max_results,
            max_pages,
            default_location,
            default_engine,
            progress_interval,
            stream_buffer,
            default_user_id,
            log_level,
        })
    }

    /// Parse an environment variable as an http(s) URL with a default value.
    fn parse_env_url(var_name: &str, default: &str) -> ConfigResult<String> {
        let value = env::var(var_name).unwrap_or_else(|_| default.to_string());
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }
        Ok(value)
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as usize with a default value.
    fn parse_env_usize(var_name: &str, default: usize) -> ConfigResult<usize> {
        match env::var(var_name) {
            Ok(val) => val.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            serpapi_url: "https://serpapi.com".to_string(),
            serpapi_key: String::new(),
            twilio_api_url: "https://api.twilio.com".to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            request_timeout: 30,
            page_size: 100,
            max_results: 100,
            max_pages: 1,
            default_location: "United States".to_string(),
            default_engine: SearchEngine::Google,
            progress_interval: 5,
            stream_buffer: 32,
            default_user_id: "local".to_string(),
            log_level: "info".to_string(),
        }
    }
}
