//! Error types for gr-core

use thiserror::Error;

/// Main error type for gr-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for gr-core
pub type Result<T> = std::result::Result<T, Error>;
