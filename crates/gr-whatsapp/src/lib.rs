//! gr-whatsapp: WhatsApp Web session client for group-relay
//!
//! The WhatsApp Web protocol is driven by an HTTP sidecar that owns the
//! browser session and its stored credentials. This crate talks to that
//! sidecar, exposes the session lifecycle (QR challenge, ready) as events and
//! implements [`SessionClient`] for the request handler.

pub mod api;
pub mod client;
pub mod error;
pub mod qr;
pub mod session;
pub mod types;

pub use api::SidecarClient;
pub use client::{find_group, SessionClient};
pub use error::{Result, WhatsAppError};
pub use qr::render_qr;
pub use session::WhatsAppSession;
pub use types::{Chat, ChatId, SessionEvent, SessionState, SidecarStatus};
