//! Error types for gr-hangouts

use thiserror::Error;

/// gr-hangouts error type
#[derive(Error, Debug)]
pub enum HangoutsError {
    #[error("Hangouts webhook URL is not configured")]
    NotConfigured,

    #[error("Hangouts webhook rejected message: {status} - {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, HangoutsError>;
