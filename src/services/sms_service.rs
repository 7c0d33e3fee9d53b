//! SMS service layer.
//!
//! Sends a text through the user's messaging account and records it against
//! the lead it was sent to.

use crate::client::MessageSender;
use crate::domain::{E164Number, RecordId};
use crate::error::{MessagingError, MessagingResult};
use crate::metrics::Metrics;
use crate::models::{MessageReceipt, OutboundMessage, SmsLog};
use crate::repositories::{MessagingAccountRepository, SmsLogRepository};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// A send request as received on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub lead_id: Option<RecordId>,
}

#[async_trait]
pub trait SmsService: Send + Sync {
    /// Send `request.message` to `request.phone_number` from the user's
    /// active number.
    async fn send(&self, user_id: &str, request: SmsRequest) -> MessagingResult<MessageReceipt>;
}

/// Default implementation of SmsService.
pub struct SmsServiceImpl {
    sender: Arc<dyn MessageSender>,
    accounts: Arc<dyn MessagingAccountRepository>,
    logs: Arc<dyn SmsLogRepository>,
    metrics: Metrics,
}

impl SmsServiceImpl {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        accounts: Arc<dyn MessagingAccountRepository>,
        logs: Arc<dyn SmsLogRepository>,
    ) -> Self {
        Self {
            sender,
            accounts,
            logs,
            metrics: Metrics::new(),
        }
    }

    /// Record into a shared collector instead of a private one.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }
}

#[async_trait]
impl SmsService for SmsServiceImpl {
    async fn send(&self, user_id: &str, request: SmsRequest) -> MessagingResult<MessageReceipt> {
        let destination = E164Number::new(request.phone_number.trim())
            .map_err(|_| MessagingError::InvalidDestination(request.phone_number.clone()))?;

        if request.message.trim().is_empty() {
            return Err(MessagingError::EmptyBody);
        }

        let account = self
            .accounts
            .get(user_id)
            .await?
            .ok_or(MessagingError::NoAccount)?;

        let receipt = self
            .sender
            .send(&OutboundMessage {
                account_sid: account.account_sid,
                auth_token: account.auth_token,
                from: account.from_number,
                to: destination.as_str().to_string(),
                body: request.message.clone(),
            })
            .await?;
        self.metrics.record_message_sent();

        if let Some(lead_id) = request.lead_id {
            let entry = SmsLog {
                lead_id,
                phone_number: destination.as_str().to_string(),
                message: request.message,
                message_id: receipt.sid.clone(),
                status: receipt.status.clone(),
                created_at: chrono::Utc::now().to_rfc3339(),
            };
            if let Err(e) = self.logs.append(&entry).await {
                tracing::error!(lead_id = %entry.lead_id, error = %e, "Failed to log SMS");
            }
        }

        Ok(receipt)
    }
}
