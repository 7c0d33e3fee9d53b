//! Lead Stream - turns web search results into a live stream of business leads.
//!
//! A query fans out to one or more search engines, each hit's snippet is mined
//! for contact details, and every hit carrying a usable channel is pushed to the
//! caller as a Server-Sent Event the moment it is found.
//!
//! # Architecture
//!
//! - **domain**: Validated value types (emails, phone numbers, ids, websites)
//! - **models**: Search requests, raw hits, contact info, stream events, leads
//! - **error**: Custom error types for precise error handling
//! - **config**: Configuration management from environment variables
//! - **client**: HTTP clients for the search and messaging providers
//! - **extraction**: Contact extraction and validation over free text
//! - **source**: Paged, deduplicated iteration over search results
//! - **stream**: The lead stream controller and its event sinks
//! - **repositories**: Storage for leads, categories, lists and message logs
//! - **services**: Lead management and SMS business logic
//! - **session**: Caller identity
//! - **server**: HTTP surface

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod extraction;
pub mod metrics;
pub mod models;
pub mod repositories;
pub mod server;
pub mod services;
pub mod session;
pub mod source;
pub mod stream;

// Re-export commonly used types
pub use client::{SearchProvider, SerpApiClient, SerpApiProvider, TwilioClient};
pub use config::Config;
pub use error::{
    ConfigError, DataError, MessagingError, RequestError, SearchApiError, SinkError, StreamError,
};
pub use extraction::{extract, ContactValidator};
pub use metrics::{HttpTimer, Metrics, MetricsSummary};
pub use models::{
    ContactInfo, LeadResult, RawSearchHit, SearchEngine, SearchRequest, StreamEvent,
};
pub use server::{router, AppState, LeadStreamServer};
pub use source::{HitStream, SearchResultSource, SourceOptions};
pub use stream::{ChannelSink, EventSink, LeadStreamController, StreamOutcome};
