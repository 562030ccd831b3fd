//! gr-hangouts: Google Chat (Hangouts) incoming webhook forwarder
//!
//! Posts relayed text to a space's incoming webhook.

pub mod error;
pub mod webhook;

pub use error::{HangoutsError, Result};
pub use webhook::HangoutsWebhook;
