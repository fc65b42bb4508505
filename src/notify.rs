// src/notify.rs
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

// --- Notification Channel ---
// Fire-and-forget text messages to the team channel. The transport exposes
// exactly one operation; delivery confirmation is a pass/fail boolean at
// the call sites.

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid webhook URL: {0}")]
    InvalidWebhookUrl(#[from] url::ParseError),
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("channel API error: {status} - {body}")]
    ChannelApi { status: u16, body: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError>;
}

// --- Slack Incoming Webhook ---

pub struct SlackWebhookNotifier {
    client: reqwest::Client,
    webhook_url: Url,
}

impl SlackWebhookNotifier {
    pub fn new(webhook_url: &str) -> Result<Self, NotifyError> {
        Ok(Self {
            client: reqwest::Client::new(),
            webhook_url: Url::parse(webhook_url)?,
        })
    }
}

#[async_trait]
impl Notifier for SlackWebhookNotifier {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let payload = serde_json::json!({ "text": text });

        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            error!("Slack webhook returned {}: {}", status, body);
            return Err(NotifyError::ChannelApi { status, body });
        }

        info!("Posted message to channel ({} chars)", text.len());
        Ok(())
    }
}

// --- Test Double ---

/// Captures messages instead of sending them. Used by tests and as the
/// fallback when no webhook URL is configured.
#[derive(Clone, Default)]
pub struct MockNotifier {
    messages_sent: Arc<Mutex<Vec<String>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_messages(&self) -> Vec<String> {
        self.messages_sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        debug!("Mock notification: {}", text);
        self.messages_sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
