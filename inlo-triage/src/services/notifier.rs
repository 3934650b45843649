//! Notification sinks for severe cases
//!
//! The workflow calls a sink synchronously and only looks at success/failure.
//! `WebhookNotifier` posts the payload as JSON (the format the email automation
//! webhook expects); `LogNotifier` is used when no webhook is configured.

use std::time::Duration;

use thiserror::Error;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::info;

use crate::models::NotificationPayload;

const USER_AGENT: &str = concat!("inlo-triage/", env!("CARGO_PKG_VERSION"));

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Webhook returned {0}: {1}")]
    Status(u16, String),

    #[error("Invalid webhook configuration: {0}")]
    Config(String),

    #[error("Cannot block for the webhook here: {0}")]
    Runtime(String),
}

/// Outbound notification capability
pub trait NotificationSink: Send + Sync {
    fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError>;
}

/// Sink that only logs the payload
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        info!(
            to = ?payload.to,
            cc = ?payload.cc,
            subject = %payload.subject,
            body = %payload.body,
            "Notification (no webhook configured)"
        );
        Ok(())
    }
}

/// Posts notifications to an HTTP webhook
///
/// `send` blocks on the captured runtime handle. On a multi-thread runtime it
/// goes through `block_in_place`; from a current-thread runtime it fails with
/// `NotifyError::Runtime` instead of panicking.
pub struct WebhookNotifier {
    http_client: reqwest::Client,
    url: String,
    runtime: Handle,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration, runtime: Handle) -> Result<Self, NotifyError> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(NotifyError::Config(format!("not an http(s) URL: {}", url)));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url,
            runtime,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        tracing::debug!(url = %self.url, "Posting notification to webhook");

        let response = self
            .http_client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Status(status.as_u16(), body))
    }
}

impl NotificationSink for WebhookNotifier {
    fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        match Handle::try_current() {
            // Plain thread: no runtime context to conflict with
            Err(_) => self.runtime.block_on(self.post(payload)),
            // Worker or blocking-pool thread of a multi-thread runtime
            Ok(current) if current.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.runtime.block_on(self.post(payload)))
            }
            Ok(_) => Err(NotifyError::Runtime(
                "called from a current-thread runtime; run the workflow on a multi-thread \
                 runtime or a plain thread"
                    .to_string(),
            )),
        }
    }
}
