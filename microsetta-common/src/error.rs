//! Common error types for Microsetta admin tooling

use thiserror::Error;

/// Common result type for Microsetta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the admin crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(String),
}
