//! Drives one search-to-lead stream from request to terminal event.

use super::sink::EventSink;
use crate::error::{SinkError, StreamError};
use crate::extraction::{extract, ContactValidator};
use crate::metrics::Metrics;
use crate::models::{LeadResult, SearchRequest, StreamEvent};
use crate::source::SearchResultSource;

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// `complete` was written
    Completed { count: usize },
    /// `error` was written, or attempted
    Failed { count: usize, reason: String },
}

impl StreamOutcome {
    /// `result` events the sink accepted before the stream ended.
    pub fn count(&self) -> usize {
        match self {
            Self::Completed { count } | Self::Failed { count, .. } => *count,
        }
    }
}

/// Pulls hits from a [`SearchResultSource`], keeps those with an email or
/// phone, and writes them to an [`EventSink`].
///
/// Event order per stream: one `status`, then a `result` per qualifying hit
/// with a `progress` after every `progress_interval`-th, then exactly one of
/// `complete` or `error`. The sink is closed exactly once afterwards.
#[derive(Clone)]
pub struct LeadStreamController {
    source: SearchResultSource,
    validator: ContactValidator,
    progress_interval: usize,
    metrics: Metrics,
}

impl LeadStreamController {
    pub fn new(source: SearchResultSource, progress_interval: usize) -> Self {
        Self {
            source,
            validator: ContactValidator::new(),
            progress_interval: progress_interval.max(1),
            metrics: Metrics::new(),
        }
    }

    /// Record into a shared collector instead of a private one.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn source(&self) -> &SearchResultSource {
        &self.source
    }

    /// Run one stream to completion.
    pub async fn run<S>(&self, request: &SearchRequest, sink: &mut S) -> StreamOutcome
    where
        S: EventSink + ?Sized,
    {
        let mut count = 0;
        let streamed = self.stream_leads(request, sink, &mut count).await;

        let outcome = match streamed {
            Ok(()) => match sink.send(&StreamEvent::complete(count)).await {
                Ok(()) => StreamOutcome::Completed { count },
                Err(err) => {
                    // The terminal frame never landed, so an error frame is still allowed
                    let reason = err.to_string();
                    let _ = sink.send(&StreamEvent::error(reason.clone())).await;
                    StreamOutcome::Failed { count, reason }
                }
            },
            Err(err) => {
                let reason = err.to_string();
                if let Err(write_err) = sink.send(&StreamEvent::error(reason.clone())).await {
                    tracing::debug!(error = %write_err, "Could not deliver error event");
                }
                StreamOutcome::Failed { count, reason }
            }
        };

        sink.close().await;

        match &outcome {
            StreamOutcome::Completed { count } => {
                self.metrics.record_stream_completed();
                tracing::info!(count, "Lead stream complete");
            }
            StreamOutcome::Failed { count, reason } => {
                self.metrics.record_stream_failed();
                tracing::warn!(count, reason = %reason, "Lead stream failed");
            }
        }

        outcome
    }

    /// Everything up to, not including, the terminal event.
    async fn stream_leads<S>(
        &self,
        request: &SearchRequest,
        sink: &mut S,
        count: &mut usize,
    ) -> Result<(), StreamError>
    where
        S: EventSink + ?Sized,
    {
        tracing::debug!(query = %request.query, "Starting lead stream");
        sink.send(&StreamEvent::started()).await?;

        let mut hits = self.source.stream(request);
        loop {
            if !sink.is_open() {
                return Err(SinkError::Disconnected.into());
            }

            let Some(hit) = hits.next().await else {
                break;
            };

            let contact = self.validator.validate(extract(&hit.snippet)).await;
            if !contact.has_contact_channel() {
                tracing::trace!(link = %hit.link, "Hit has no contact channel");
                continue;
            }

            tracing::debug!(link = %hit.link, "Qualifying lead");
            sink.send(&StreamEvent::result(LeadResult::capture(hit, contact)))
                .await?;
            *count += 1;
            self.metrics.record_lead_emitted();

            if *count % self.progress_interval == 0 {
                sink.send(&StreamEvent::progress(*count)).await?;
            }
        }

        if hits.all_engines_failed() {
            if let Some(err) = hits.take_last_error() {
                return Err(StreamError::Provider(err));
            }
        }

        Ok(())
    }
}
