//! WhatsApp session and chat types

use serde::{Deserialize, Serialize};

/// Opaque chat handle required for sending
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatId {
    /// Serialized identifier, e.g. `123456789@g.us`
    #[serde(rename = "_serialized")]
    pub serialized: String,
}

/// A conversation as listed by the sidecar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    /// Display name (unset for some direct chats)
    #[serde(default)]
    pub name: Option<String>,
    /// Whether this is a group conversation
    #[serde(default)]
    pub is_group: bool,
}

impl Chat {
    /// Build a group chat record
    pub fn group(name: &str, serialized_id: &str) -> Self {
        Self {
            id: ChatId {
                serialized: serialized_id.to_string(),
            },
            name: Some(name.to_string()),
            is_group: true,
        }
    }

    /// Build a direct (non-group) chat record
    pub fn direct(name: &str, serialized_id: &str) -> Self {
        Self {
            is_group: false,
            ..Self::group(name, serialized_id)
        }
    }
}

/// Session status as reported by the sidecar
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SidecarStatus {
    Starting,
    ScanQrCode,
    Working,
    Failed,
    Stopped,
    #[serde(other)]
    Unknown,
}

/// Local view of the session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Starting,
    /// Waiting for the operator to scan the QR code
    AwaitingScan,
    Ready,
    Failed,
    Stopped,
}

/// Lifecycle notifications published to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Authentication challenge to render and scan
    Qr(String),
    /// Session authenticated and usable
    Ready,
    /// Session could not be established
    Failed(String),
}
