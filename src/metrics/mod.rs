//! Basic metrics instrumentation for the search-to-lead pipeline.
//!
//! Provides counters and duration tracking for provider requests, stream
//! outcomes and outbound messages.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector shared by clients, the search source and the controller.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Total number of HTTP requests made
    http_requests_total: Arc<AtomicU64>,

    /// Total number of HTTP errors
    http_errors_total: Arc<AtomicU64>,

    /// Total duration of all HTTP requests in milliseconds
    http_duration_total_ms: Arc<AtomicU64>,

    /// Engine calls that failed and were absorbed
    provider_errors_total: Arc<AtomicU64>,

    /// Hits handed to consumers
    hits_yielded_total: Arc<AtomicU64>,

    /// Hits dropped because their link was already seen
    duplicates_dropped_total: Arc<AtomicU64>,

    /// `result` events written
    leads_emitted_total: Arc<AtomicU64>,

    /// Streams that ended with `complete`
    streams_completed_total: Arc<AtomicU64>,

    /// Streams that ended with `error`
    streams_failed_total: Arc<AtomicU64>,

    /// Text messages accepted by the provider
    messages_sent_total: Arc<AtomicU64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            http_requests_total: Arc::new(AtomicU64::new(0)),
            http_errors_total: Arc::new(AtomicU64::new(0)),
            http_duration_total_ms: Arc::new(AtomicU64::new(0)),
            provider_errors_total: Arc::new(AtomicU64::new(0)),
            hits_yielded_total: Arc::new(AtomicU64::new(0)),
            duplicates_dropped_total: Arc::new(AtomicU64::new(0)),
            leads_emitted_total: Arc::new(AtomicU64::new(0)),
            streams_completed_total: Arc::new(AtomicU64::new(0)),
            streams_failed_total: Arc::new(AtomicU64::new(0)),
            messages_sent_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record an HTTP request with duration.
    pub fn record_http_request(&self, duration: Duration) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_duration_total_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record an HTTP error.
    pub fn record_http_error(&self) {
        self.http_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_error(&self) {
        self.provider_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit_yielded(&self) {
        self.hits_yielded_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate_dropped(&self) {
        self.duplicates_dropped_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lead_emitted(&self) {
        self.leads_emitted_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stream_completed(&self) {
        self.streams_completed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stream_failed(&self) {
        self.streams_failed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_sent(&self) {
        self.messages_sent_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total HTTP requests.
    pub fn http_requests_total(&self) -> u64 {
        self.http_requests_total.load(Ordering::Relaxed)
    }

    /// Get total HTTP errors.
    pub fn http_errors_total(&self) -> u64 {
        self.http_errors_total.load(Ordering::Relaxed)
    }

    /// Get average HTTP request duration in milliseconds.
    pub fn http_duration_avg_ms(&self) -> f64 {
        let total = self.http_duration_total_ms.load(Ordering::Relaxed);
        let count = self.http_requests_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    pub fn provider_errors_total(&self) -> u64 {
        self.provider_errors_total.load(Ordering::Relaxed)
    }

    pub fn hits_yielded_total(&self) -> u64 {
        self.hits_yielded_total.load(Ordering::Relaxed)
    }

    pub fn duplicates_dropped_total(&self) -> u64 {
        self.duplicates_dropped_total.load(Ordering::Relaxed)
    }

    pub fn leads_emitted_total(&self) -> u64 {
        self.leads_emitted_total.load(Ordering::Relaxed)
    }

    pub fn streams_completed_total(&self) -> u64 {
        self.streams_completed_total.load(Ordering::Relaxed)
    }

    pub fn streams_failed_total(&self) -> u64 {
        self.streams_failed_total.load(Ordering::Relaxed)
    }

    pub fn messages_sent_total(&self) -> u64 {
        self.messages_sent_total.load(Ordering::Relaxed)
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        for counter in [
            &self.http_requests_total,
            &self.http_errors_total,
            &self.http_duration_total_ms,
            &self.provider_errors_total,
            &self.hits_yielded_total,
            &self.duplicates_dropped_total,
            &self.leads_emitted_total,
            &self.streams_completed_total,
            &self.streams_failed_total,
            &self.messages_sent_total,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get a summary of all metrics.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            http_requests_total: self.http_requests_total(),
            http_errors_total: self.http_errors_total(),
            http_duration_avg_ms: self.http_duration_avg_ms(),
            provider_errors_total: self.provider_errors_total(),
            hits_yielded_total: self.hits_yielded_total(),
            duplicates_dropped_total: self.duplicates_dropped_total(),
            leads_emitted_total: self.leads_emitted_total(),
            streams_completed_total: self.streams_completed_total(),
            streams_failed_total: self.streams_failed_total(),
            messages_sent_total: self.messages_sent_total(),
        }
    }
}

/// A snapshot of metrics values.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
    pub http_duration_avg_ms: f64,
    pub provider_errors_total: u64,
    pub hits_yielded_total: u64,
    pub duplicates_dropped_total: u64,
    pub leads_emitted_total: u64,
    pub streams_completed_total: u64,
    pub streams_failed_total: u64,
    pub messages_sent_total: u64,
}

/// Timer helper for measuring operation duration.
pub struct HttpTimer {
    start: Instant,
    metrics: Metrics,
}

impl HttpTimer {
    /// Start a new timer.
    pub fn start(metrics: Metrics) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    /// Stop the timer and record the duration.
    pub fn stop(self) {
        let duration = self.start.elapsed();
        self.metrics.record_http_request(duration);
    }

    /// Stop the timer and record an error.
    pub fn stop_with_error(self) {
        let duration = self.start.elapsed();
        self.metrics.record_http_request(duration);
        self.metrics.record_http_error();
    }
}
