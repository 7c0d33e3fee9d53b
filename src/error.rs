//! Error types for the lead stream service.
//!
//! This module defines custom error types using `thiserror` for precise error handling.
//! Each layer gets its own enum so callers can tell a provider failure (absorbed per
//! engine) apart from a sink failure (fatal to the stream) or a bad request (rejected
//! before any stream opens).

use thiserror::Error;

/// Errors that can occur when calling the upstream search provider.
#[derive(Error, Debug)]
pub enum SearchApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Provider returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Network timeout
    #[error("Request timeout")]
    Timeout,

    /// API key rejected
    #[error("Authentication failed")]
    Unauthorized,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Response parsed but did not have the expected shape
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

/// Errors raised while writing events to the outbound channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The receiving side of the channel is gone (client disconnected)
    #[error("Client disconnected")]
    Disconnected,

    /// A write was attempted after the sink was closed
    #[error("Event sink already closed")]
    Closed,

    /// The event could not be serialized
    #[error("Failed to encode event: {0}")]
    Encode(String),
}

/// Errors that terminate a lead stream with an `error` event.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Writing to the outbound channel failed
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Every configured engine failed before producing any data
    #[error("All search engines failed: {0}")]
    Provider(#[from] SearchApiError),
}

/// Errors for malformed incoming search submissions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// `searchQuery` missing or blank
    #[error("Search query is required")]
    MissingQuery,

    /// Engine name not recognized
    #[error("Unknown search engine: {0}")]
    UnknownEngine(String),

    /// Result limit outside the accepted range
    #[error("Invalid result limit {value}: must be between 1 and {max}")]
    InvalidLimit { value: usize, max: usize },
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Errors from the data-access collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// Record not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Input rejected by validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No current user
    #[error("Unauthorized")]
    Unauthorized,

    /// Backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Errors that can occur when sending outbound messages.
#[derive(Error, Debug)]
pub enum MessagingError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Provider returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Credentials rejected
    #[error("Authentication failed")]
    Unauthorized,

    /// Destination is not a dialable number
    #[error("Invalid phone number format: {0}")]
    InvalidDestination(String),

    /// Message body missing
    #[error("Message body cannot be empty")]
    EmptyBody,

    /// The user has no messaging account configured
    #[error("No messaging account configured")]
    NoAccount,

    /// Account lookup failed
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Convenience type alias for Results with SearchApiError
pub type SearchApiResult<T> = Result<T, SearchApiError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience type alias for Results with DataError
pub type DataResult<T> = Result<T, DataError>;

/// Convenience type alias for Results with MessagingError
pub type MessagingResult<T> = Result<T, MessagingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchApiError::MalformedPayload("missing organic_results".to_string());
        assert_eq!(err.to_string(), "Malformed payload: missing organic_results");

        let err = ConfigError::MissingVar("SERPAPI_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: SERPAPI_KEY"
        );

        let err = RequestError::MissingQuery;
        assert_eq!(err.to_string(), "Search query is required");

        let err = SinkError::Disconnected;
        assert_eq!(err.to_string(), "Client disconnected");
    }

    #[test]
    fn test_api_error_variants() {
        let err = SearchApiError::ApiError {
            status: 503,
            message: "Service unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("Service unavailable"));
    }

    #[test]
    fn test_stream_error_wraps_sink_error_transparently() {
        let err: StreamError = SinkError::Closed.into();
        assert_eq!(err.to_string(), "Event sink already closed");

        let err: StreamError = SearchApiError::Timeout.into();
        assert_eq!(err.to_string(), "All search engines failed: Request timeout");
    }

    #[test]
    fn test_invalid_limit_message() {
        let err = RequestError::InvalidLimit {
            value: 0,
            max: 1000,
        };
        assert_eq!(
            err.to_string(),
            "Invalid result limit 0: must be between 1 and 1000"
        );
    }
}
