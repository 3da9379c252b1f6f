//! # Microsetta Common Library
//!
//! Shared code for the Microsetta admin tooling:
//! - Error types
//! - Bootstrap configuration loading (CLI → ENV → TOML → default)
//! - Authenticated client for the private REST API

pub mod api_client;
pub mod config;
pub mod error;

pub use api_client::{ApiClient, ApiFailure};
pub use error::{Error, Result};
