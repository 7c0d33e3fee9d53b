//! HTTP server for the lead stream service.
//!
//! Exposes the streaming search endpoint and the lead, category, list and
//! SMS collaborators over axum.

pub mod handlers;

use crate::client::{
    MessageSender, SearchProvider, SerpApiClient, SerpApiProvider, TwilioClient, TwilioSender,
};
use crate::config::Config;
use crate::metrics::Metrics;
use crate::repositories::{
    InMemoryCategoryRepository, InMemoryLeadRepository, InMemoryListRepository,
    InMemoryMessagingAccountRepository, InMemorySmsLogRepository, MessagingAccountRepository,
};
use crate::services::{LeadService, LeadServiceImpl, SmsService, SmsServiceImpl};
use crate::session::{IdentityProvider, StaticIdentityProvider};
use crate::source::{SearchResultSource, SourceOptions};
use crate::stream::LeadStreamController;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    controller: LeadStreamController,
    leads: Arc<dyn LeadService>,
    sms: Arc<dyn SmsService>,
    accounts: Arc<dyn MessagingAccountRepository>,
    identity: Arc<dyn IdentityProvider>,
    metrics: Metrics,
}

impl AppState {
    /// Wire the service against the real search and messaging providers.
    pub fn from_config(config: Config) -> Self {
        let metrics = Metrics::new();
        let provider =
            SerpApiProvider::new(SerpApiClient::new(&config).with_metrics(metrics.clone()));
        let sender = TwilioSender::new(TwilioClient::new(&config).with_metrics(metrics.clone()));
        Self::with_metrics(config, Arc::new(provider), Arc::new(sender), metrics)
    }

    /// Wire the service against the given providers, with in-memory storage
    /// and the static identity provider.
    pub fn new(
        config: Config,
        provider: Arc<dyn SearchProvider>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self::with_metrics(config, provider, sender, Metrics::new())
    }

    fn with_metrics(
        config: Config,
        provider: Arc<dyn SearchProvider>,
        sender: Arc<dyn MessageSender>,
        metrics: Metrics,
    ) -> Self {
        let source = SearchResultSource::new(provider, SourceOptions::from_config(&config))
            .with_metrics(metrics.clone());
        let controller = LeadStreamController::new(source, config.progress_interval)
            .with_metrics(metrics.clone());

        let leads = LeadServiceImpl::new(
            Arc::new(InMemoryLeadRepository::new()),
            Arc::new(InMemoryCategoryRepository::new()),
            Arc::new(InMemoryListRepository::new()),
        );

        let accounts: Arc<dyn MessagingAccountRepository> =
            Arc::new(InMemoryMessagingAccountRepository::new());
        let sms = SmsServiceImpl::new(
            sender,
            accounts.clone(),
            Arc::new(InMemorySmsLogRepository::new()),
        )
        .with_metrics(metrics.clone());

        Self {
            identity: Arc::new(StaticIdentityProvider::new(config.default_user_id.clone())),
            config: Arc::new(config),
            controller,
            leads: Arc::new(leads),
            sms: Arc::new(sms),
            accounts,
            metrics,
        }
    }

    /// Replace the identity provider.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    /// Messaging credentials store, for provisioning accounts.
    pub fn messaging_accounts(&self) -> Arc<dyn MessagingAccountRepository> {
        self.accounts.clone()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/api/search", post(handlers::search_stream))
        .route("/api/search/results", post(handlers::search_results))
        .route(
            "/api/leads",
            get(handlers::list_leads).post(handlers::create_lead),
        )
        .route(
            "/api/leads/categories",
            get(handlers::list_categories)
                .post(handlers::create_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/api/leads/lists",
            get(handlers::get_lists)
                .post(handlers::create_list)
                .put(handlers::update_list)
                .delete(handlers::delete_list),
        )
        .route("/api/sms", post(handlers::send_sms))
        .with_state(state)
}

/// A server running in a background task.
pub struct LeadStreamServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl LeadStreamServer {
    /// Bind `bind_addr` (port `0` picks a free port) and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(state: AppState, bind_addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", bind_addr))?;
        let addr = listener.local_addr().context("Failed to read local address")?;

        tracing::info!("Lead stream server listening on http://{}", addr);

        let app = router(state);
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Server error: {}", e);
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for LeadStreamServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve on the configured address until the process is stopped.
pub async fn run_server(state: AppState) -> Result<()> {
    let bind_addr = state.config.bind_addr.clone();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("Lead stream server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;

    Ok(())
}
