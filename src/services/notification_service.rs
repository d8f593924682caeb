use crate::error::Result;
use crate::models::application::ApplicationStatus;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Serialize;
use sha2::Sha256;
use std::sync::Arc;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    InterviewScheduled {
        interview_id: Uuid,
        application_id: Uuid,
        scheduled_at: DateTime<Utc>,
        participant_ids: Vec<Uuid>,
    },
    InterviewRescheduled {
        interview_id: Uuid,
        scheduled_at: DateTime<Utc>,
    },
    InterviewCancelled {
        interview_id: Uuid,
        reason: Option<String>,
    },
    InterviewReminder {
        interview_id: Uuid,
        scheduled_at: DateTime<Utc>,
        participant_ids: Vec<Uuid>,
    },
    ApplicationStatusChanged {
        application_id: Uuid,
        from_status: ApplicationStatus,
        to_status: ApplicationStatus,
    },
    OfferExtended {
        offer_id: Uuid,
        application_id: Uuid,
        expires_at: DateTime<Utc>,
    },
}

/// Outbound notification channel. Delivery is best-effort; the workflow
/// services never await it for correctness and a failure never rolls back
/// the operation that raised the event.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &NotificationEvent) -> Result<()>;
}

/// Delivers events to a webhook endpoint, signing the JSON body with
/// HMAC-SHA256 so the receiver can verify origin.
pub struct WebhookNotifier {
    client: Client,
    target_url: String,
    secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(target_url: String, secret: Option<String>) -> Self {
        Self {
            client: Client::new(),
            target_url,
            secret,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<()> {
        let body = serde_json::to_vec(event).map_err(anyhow::Error::from)?;

        let mut request = self
            .client
            .post(&self.target_url)
            .header("Content-Type", "application/json");
        if let Some(secret) = &self.secret {
            let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
                .map_err(|e| anyhow::anyhow!("Invalid webhook secret: {}", e))?;
            mac.update(&body);
            let signature = hex::encode(mac.finalize().into_bytes());
            request = request.header("X-Webhook-Signature", signature);
        }

        let response = request.body(body).send().await?;
        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                url = %self.target_url,
                "Webhook endpoint returned non-success"
            );
        }
        Ok(())
    }
}

/// Sink for deployments without a webhook endpoint configured.
pub struct NoopNotifier;

#[async_trait::async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _event: &NotificationEvent) -> Result<()> {
        Ok(())
    }
}

/// Fire-and-forget delivery: spawn, log on failure, never join back into
/// the caller's unit of work.
pub fn notify_detached(notifier: &Arc<dyn Notifier>, event: NotificationEvent) {
    let notifier = notifier.clone();
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&event).await {
            tracing::warn!(error = ?e, "Notification delivery failed");
        }
    });
}
