//! Error types for gr-api

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::handlers::ErrorResponse;

/// Request failures and their HTTP mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing groupName or message in request body.")]
    MissingFields,

    #[error("Forbidden: Group \"{0}\" is not allowed.")]
    GroupNotAllowed(String),

    #[error("Group \"{0}\" not found.")]
    GroupNotFound(String),

    #[error("WhatsApp delivery failed: {0}")]
    Delivery(String),

    #[error("Hangouts webhook URL is not configured.")]
    WebhookNotConfigured,

    #[error("Hangouts forwarding failed: {0}")]
    Forward(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::GroupNotAllowed(_) => StatusCode::FORBIDDEN,
            Self::GroupNotFound(_) => StatusCode::NOT_FOUND,
            Self::Delivery(_) | Self::WebhookNotConfigured | Self::Forward(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the caller; downstream detail stays in the logs
    fn public_message(&self) -> String {
        match self {
            Self::Delivery(_) => "Failed to send message.".to_string(),
            Self::Forward(_) => "Failed to forward message to Hangouts.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Error sending message: {}", self);
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;
