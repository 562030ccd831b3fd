//! gr-core: group-relay core library
//!
//! Configuration, the group allow-list and the delivery mode shared by the
//! HTTP API and the gateway binary.

pub mod allowlist;
pub mod config;
pub mod error;

pub use allowlist::AllowList;
pub use config::{Config, DeliveryMode, HangoutsConfig, ServerConfig, WhatsAppConfig};
pub use error::{Error, Result};
