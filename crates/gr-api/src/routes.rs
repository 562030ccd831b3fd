//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{root, send_message};
use crate::server::AppState;

/// Create the API router
pub fn routes() -> Router<AppState> {
    Router::new()
        // Liveness
        .route("/", get(root))
        .route("/send-message", post(send_message))
}
