//! Error types for gr-whatsapp

use thiserror::Error;

/// gr-whatsapp error type
#[derive(Error, Debug)]
pub enum WhatsAppError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WhatsApp sidecar error: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("QR code rendering failed: {0}")]
    QrRender(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, WhatsAppError>;
