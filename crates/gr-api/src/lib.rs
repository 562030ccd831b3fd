//! gr-api: HTTP API for group-relay
//!
//! Accepts `POST /send-message` requests, checks them against the group
//! allow-list and delivers the text to WhatsApp and/or Hangouts.
//! Built with axum for async HTTP handling.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{app, start_server, AppState, Delivery};
