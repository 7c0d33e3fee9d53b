//! HTTP client for the Twilio messaging API.

use crate::config::Config;
use crate::error::{MessagingError, MessagingResult};
use crate::metrics::Metrics;
use crate::models::{MessageReceipt, OutboundMessage};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Error body returned by the messaging API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Blocking client for sending text messages.
///
/// Credentials travel with each [`OutboundMessage`] since every user has
/// their own messaging account.
#[derive(Clone)]
pub struct TwilioClient {
    base_url: String,
    agent: Arc<ureq::Agent>,
    metrics: Metrics,
}

impl TwilioClient {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout))
            .build();

        Self {
            base_url: config.twilio_api_url.clone(),
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();

        Self {
            base_url,
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Record into a shared collector instead of a private one.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(account_sid)
        )
    }

    fn map_error(&self, error: ureq::Error) -> MessagingError {
        match error {
            ureq::Error::Status(code, response) => {
                let body = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                let message = serde_json::from_str::<ApiErrorBody>(&body)
                    .map(|b| b.message)
                    .ok()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(body);

                match code {
                    401 => MessagingError::Unauthorized,
                    _ => MessagingError::ApiError {
                        status: code,
                        message,
                    },
                }
            }
            ureq::Error::Transport(transport) => MessagingError::HttpError(transport.to_string()),
        }
    }

    /// Send one message and return the provider's receipt.
    pub fn send(&self, message: &OutboundMessage) -> MessagingResult<MessageReceipt> {
        let start = Instant::now();
        let credentials =
            STANDARD.encode(format!("{}:{}", message.account_sid, message.auth_token));

        let result = self
            .agent
            .post(&self.messages_url(&message.account_sid))
            .set("Authorization", &format!("Basic {}", credentials))
            .send_form(&[
                ("To", message.to.as_str()),
                ("From", message.from.as_str()),
                ("Body", message.body.as_str()),
            ])
            .map_err(|e| self.map_error(e));

        let duration = start.elapsed();
        if result.is_err() {
            self.metrics.record_http_error();
        }
        self.metrics.record_http_request(duration);

        let body = result?
            .into_string()
            .map_err(|e| MessagingError::HttpError(e.to_string()))?;
        let receipt: MessageReceipt = serde_json::from_str(&body)?;

        tracing::info!(sid = %receipt.sid, status = %receipt.status, "Message accepted");
        Ok(receipt)
    }
}
