//! Incoming webhook client

use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{HangoutsError, Result};

/// Outgoing webhook payload
#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
}

/// Forwards text to a Google Chat incoming webhook
#[derive(Debug, Clone)]
pub struct HangoutsWebhook {
    client: Client,
    url: Option<String>,
}

impl HangoutsWebhook {
    /// Create a forwarder; `None` means forwarding is not configured
    pub fn new(url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.filter(|u| !u.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// POST `{"text": text}` to the webhook
    ///
    /// Only the response status is inspected.
    pub async fn forward(&self, text: &str) -> Result<()> {
        let url = self.url.as_deref().ok_or(HangoutsError::NotConfigured)?;

        let response = self
            .client
            .post(url)
            .json(&WebhookMessage { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Hangouts webhook returned {}: {}", status, body);
            return Err(HangoutsError::Rejected { status, body });
        }

        info!("Message forwarded to Hangouts");
        Ok(())
    }
}
