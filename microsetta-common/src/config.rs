//! Configuration loading and resolution
//!
//! Bootstrap configuration comes from a small TOML file. Each setting is
//! resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The private API bearer token is deliberately absent from the TOML file; it
//! only ever arrives from the command line, the environment, or a forwarded
//! request header.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const ENV_PRIVATE_API_URL: &str = "MICROSETTA_PRIVATE_API_URL";
pub const ENV_CA_FILE: &str = "MICROSETTA_CA_FILE";
pub const ENV_API_TOKEN: &str = "MICROSETTA_API_TOKEN";
pub const ENV_ADMIN_PORT: &str = "MICROSETTA_ADMIN_PORT";

const DEFAULT_PRIVATE_API_URL: &str = "https://localhost:8082";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional in the file; missing values fall back to the
/// compiled defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the private REST API
    #[serde(default)]
    pub private_api_url: Option<String>,

    /// Extra root certificate (PEM) trusted when talking to the private API
    #[serde(default)]
    pub ca_file: Option<PathBuf>,

    /// Per-call timeout for upstream requests, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            private_api_url: None,
            ca_file: None,
            request_timeout_secs: default_request_timeout_secs(),
            port: default_port(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_port() -> u16 {
    8083
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub private_api_url: Option<String>,
    pub ca_file: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub port: Option<u16>,
}

/// Connection settings for the private API
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL without trailing slash
    pub base_url: String,
    pub ca_file: Option<PathBuf>,
    pub timeout: Duration,
}

/// Fully resolved admin configuration
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub api: ApiSettings,
    pub port: u16,
}

/// Default configuration file path for the platform
///
/// `<config_dir>/microsetta/admin.toml`, e.g. `~/.config/microsetta/admin.toml`
/// on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("microsetta").join("admin.toml"))
}

/// Parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load the bootstrap configuration
///
/// An explicitly requested file must exist. The platform default file is
/// optional; when absent, built-in defaults are used.
pub fn load_config_file(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        info!("Loading configuration from {}", path.display());
        return load_toml_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading configuration from {}", path.display());
            load_toml_config(&path)
        }
        _ => {
            debug!("No configuration file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Resolve every setting using CLI → ENV → TOML → default priority
pub fn resolve_config(cli: &CliOverrides, toml_config: &TomlConfig) -> Result<AdminConfig> {
    let base_url = cli
        .private_api_url
        .clone()
        .or_else(|| env_non_empty(ENV_PRIVATE_API_URL))
        .or_else(|| toml_config.private_api_url.clone())
        .unwrap_or_else(|| DEFAULT_PRIVATE_API_URL.to_string());
    let base_url = validate_base_url(&base_url)?;

    let ca_file = cli
        .ca_file
        .clone()
        .or_else(|| env_non_empty(ENV_CA_FILE).map(PathBuf::from))
        .or_else(|| toml_config.ca_file.clone());

    let port = match cli.port {
        Some(port) => port,
        None => match env_non_empty(ENV_ADMIN_PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                Error::Config(format!("Invalid {} '{}': {}", ENV_ADMIN_PORT, raw, e))
            })?,
            None => toml_config.port,
        },
    };

    let timeout_secs = cli
        .request_timeout_secs
        .unwrap_or(toml_config.request_timeout_secs);
    if timeout_secs == 0 {
        return Err(Error::Config(
            "request_timeout_secs must be greater than zero".to_string(),
        ));
    }

    Ok(AdminConfig {
        api: ApiSettings {
            base_url,
            ca_file,
            timeout: Duration::from_secs(timeout_secs),
        },
        port,
    })
}

/// Resolve the private API bearer token (CLI → ENV)
pub fn resolve_api_token(cli_token: Option<&str>) -> Option<String> {
    cli_token
        .map(str::to_string)
        .filter(|t| !t.trim().is_empty())
        .or_else(|| env_non_empty(ENV_API_TOKEN))
}

/// Check that a base URL is usable and strip any trailing slash
pub fn validate_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("private_api_url is empty".to_string()));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Config(format!(
            "private_api_url must be http(s): {}",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
