//! Async wrappers around the synchronous provider clients.
//!
//! This module provides async interfaces to the blocking clients by using
//! `tokio::task::spawn_blocking` to run HTTP operations on a dedicated thread pool,
//! preventing blocking of the async runtime.

use crate::client::{SerpApiClient, TwilioClient};
use crate::error::{MessagingError, MessagingResult, SearchApiError, SearchApiResult};
use crate::models::{MessageReceipt, OutboundMessage, ProviderQuery, RawSearchHit};
use async_trait::async_trait;
use std::sync::Arc;

/// A pluggable upstream search provider. One call fetches one page.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &ProviderQuery) -> SearchApiResult<Vec<RawSearchHit>>;
}

/// Outbound text messaging.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> MessagingResult<MessageReceipt>;
}

/// [`SearchProvider`] backed by [`SerpApiClient`].
#[derive(Clone)]
pub struct SerpApiProvider {
    client: Arc<SerpApiClient>,
}

impl SerpApiProvider {
    pub fn new(client: SerpApiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    async fn search(&self, query: &ProviderQuery) -> SearchApiResult<Vec<RawSearchHit>> {
        let client = self.client.clone();
        let query = query.clone();

        tokio::task::spawn_blocking(move || client.search(&query))
            .await
            .map_err(|e| SearchApiError::HttpError(format!("Task join error: {}", e)))?
    }
}

/// [`MessageSender`] backed by [`TwilioClient`].
#[derive(Clone)]
pub struct TwilioSender {
    client: Arc<TwilioClient>,
}

impl TwilioSender {
    pub fn new(client: TwilioClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl MessageSender for TwilioSender {
    async fn send(&self, message: &OutboundMessage) -> MessagingResult<MessageReceipt> {
        let client = self.client.clone();
        let message = message.clone();

        tokio::task::spawn_blocking(move || client.send(&message))
            .await
            .map_err(|e| MessagingError::HttpError(format!("Task join error: {}", e)))?
    }
}
