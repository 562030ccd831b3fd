//! WhatsApp session lifecycle
//!
//! [`WhatsAppSession`] is the one long-lived session shared by every request.
//! It is constructed idle, started with [`WhatsAppSession::initialize`], and
//! released with [`WhatsAppSession::shutdown`]. Authentication progress is
//! published as [`SessionEvent`]s to subscribers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use gr_core::WhatsAppConfig;

use crate::api::SidecarClient;
use crate::client::SessionClient;
use crate::error::Result;
use crate::types::{Chat, SessionEvent, SessionState, SidecarStatus};

const EVENT_CAPACITY: usize = 16;

/// Shared WhatsApp Web session
pub struct WhatsAppSession {
    api: SidecarClient,
    poll_interval: Duration,
    state: Arc<RwLock<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl WhatsAppSession {
    /// Create an idle session; nothing is contacted until `initialize`
    pub fn new(config: &WhatsAppConfig) -> Result<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            api: SidecarClient::new(config)?,
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            state: Arc::new(RwLock::new(SessionState::Starting)),
            events,
            watcher: Mutex::new(None),
        })
    }

    /// Override the status poll cadence
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Subscribe to lifecycle events
    ///
    /// Events published before subscribing are not replayed, so subscribe
    /// before calling `initialize`.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current lifecycle state
    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    pub async fn is_ready(&self) -> bool {
        self.state().await == SessionState::Ready
    }

    /// Start the session and watch it until it is ready or has failed
    pub async fn initialize(&self) -> Result<()> {
        *self.state.write().await = SessionState::Starting;
        self.api.start_session().await?;

        let handle = tokio::spawn(watch_session(
            self.api.clone(),
            self.poll_interval,
            Arc::clone(&self.state),
            self.events.clone(),
        ));

        if let Some(previous) = self.watcher.lock().await.replace(handle) {
            previous.abort();
        }

        Ok(())
    }

    /// Stop watching and release the session at the sidecar
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(handle) = self.watcher.lock().await.take() {
            handle.abort();
        }

        *self.state.write().await = SessionState::Stopped;
        self.api.stop_session().await
    }
}

#[async_trait]
impl SessionClient for WhatsAppSession {
    async fn chats(&self) -> Result<Vec<Chat>> {
        self.api.chats().await
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        self.api.send_text(chat_id, text).await
    }
}

/// Poll the sidecar until the session reaches a terminal status
///
/// Each distinct QR payload is published once.
async fn watch_session(
    api: SidecarClient,
    poll_interval: Duration,
    state: Arc<RwLock<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    let mut last_qr: Option<String> = None;

    loop {
        ticker.tick().await;

        let status = match api.session_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to poll WhatsApp session status: {}", e);
                continue;
            }
        };

        match status {
            SidecarStatus::Starting | SidecarStatus::Unknown => {
                debug!("WhatsApp session {} status: {:?}", api.session_name(), status);
            }
            SidecarStatus::ScanQrCode => {
                *state.write().await = SessionState::AwaitingScan;

                match api.qr_code().await {
                    Ok(code) if last_qr.as_deref() != Some(code.as_str()) => {
                        info!("WhatsApp: QR code available (scan with your phone)");
                        let _ = events.send(SessionEvent::Qr(code.clone()));
                        last_qr = Some(code);
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Failed to fetch WhatsApp QR code: {}", e),
                }
            }
            SidecarStatus::Working => {
                *state.write().await = SessionState::Ready;
                info!("WhatsApp client is ready");
                let _ = events.send(SessionEvent::Ready);
                break;
            }
            SidecarStatus::Failed | SidecarStatus::Stopped => {
                *state.write().await = SessionState::Failed;
                let reason = format!("session {} reported {:?}", api.session_name(), status);
                warn!("WhatsApp {}", reason);
                let _ = events.send(SessionEvent::Failed(reason));
                break;
            }
        }
    }
}
