//! WhatsApp Web HTTP sidecar client
//!
//! Communicates with the sidecar that runs the WhatsApp Web session.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info};

use gr_core::WhatsAppConfig;

use crate::error::{Result, WhatsAppError};
use crate::types::{Chat, SidecarStatus};

/// Sidecar REST API client
#[derive(Debug, Clone)]
pub struct SidecarClient {
    client: Client,
    base_url: String,
    session: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionInfo {
    status: SidecarStatus,
}

#[derive(Debug, Deserialize)]
struct QrValue {
    value: String,
}

impl SidecarClient {
    /// Create a new sidecar client
    pub fn new(config: &WhatsAppConfig) -> Result<Self> {
        let base_url = config.api_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(WhatsAppError::Config(format!(
                "WhatsApp API URL must be http(s): {:?}",
                config.api_url
            )));
        }

        Ok(Self {
            client: Client::builder().build()?,
            base_url,
            session: config.session.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn session_name(&self) -> &str {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);

        match &self.api_key {
            Some(key) => builder.header("X-Api-Key", key),
            None => builder,
        }
    }

    async fn ensure_success(response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        error!("{} failed: {} - {}", action, status, text);
        Err(WhatsAppError::Api(format!("{} failed: {} - {}", action, status, text)))
    }

    /// Ask the sidecar to start (or resume) the session
    ///
    /// A session that already exists is not an error.
    pub async fn start_session(&self) -> Result<()> {
        let response = self
            .request(Method::POST, "/api/sessions/start")
            .json(&serde_json::json!({ "name": self.session }))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            debug!("Session {} already started", self.session);
            return Ok(());
        }

        Self::ensure_success(response, "Start session").await?;
        info!("Started WhatsApp session {}", self.session);
        Ok(())
    }

    /// Current session status
    pub async fn session_status(&self) -> Result<SidecarStatus> {
        let response = self
            .request(Method::GET, &format!("/api/sessions/{}", self.session))
            .send()
            .await?;
        let response = Self::ensure_success(response, "Get session status").await?;

        let info: SessionInfo = response
            .json()
            .await
            .map_err(|e| WhatsAppError::Parse(e.to_string()))?;

        Ok(info.status)
    }

    /// Raw QR payload for pairing
    pub async fn qr_code(&self) -> Result<String> {
        let response = self
            .request(Method::GET, &format!("/api/{}/auth/qr", self.session))
            .query(&[("format", "raw")])
            .send()
            .await?;
        let response = Self::ensure_success(response, "Get QR code").await?;

        let qr: QrValue = response
            .json()
            .await
            .map_err(|e| WhatsAppError::Parse(e.to_string()))?;

        Ok(qr.value)
    }

    /// List all chats of the session
    pub async fn chats(&self) -> Result<Vec<Chat>> {
        let response = self
            .request(Method::GET, &format!("/api/{}/chats", self.session))
            .send()
            .await?;
        let response = Self::ensure_success(response, "List chats").await?;

        let chats: Vec<Chat> = response
            .json()
            .await
            .map_err(|e| WhatsAppError::Parse(e.to_string()))?;

        debug!("Fetched {} chats", chats.len());
        Ok(chats)
    }

    /// Send a text message to a chat
    pub async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "session": self.session,
            "chatId": chat_id,
            "text": text,
        });

        debug!("Sending message to {}", chat_id);

        let response = self
            .request(Method::POST, "/api/sendText")
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(response, "Send message").await?;

        info!("Message sent to {}", chat_id);
        Ok(())
    }

    /// Stop the session at the sidecar
    pub async fn stop_session(&self) -> Result<()> {
        let response = self
            .request(Method::POST, "/api/sessions/stop")
            .json(&serde_json::json!({ "name": self.session }))
            .send()
            .await?;
        Self::ensure_success(response, "Stop session").await?;

        info!("Stopped WhatsApp session {}", self.session);
        Ok(())
    }
}
