//! Host settings read from the environment (and an optional `.env` file,
//! loaded in `main` before this runs).
//!
//! | variable                 | default     |
//! |--------------------------|-------------|
//! | `MERCHANT_HOST`          | `127.0.0.1` |
//! | `MERCHANT_PORT`          | `8080`      |
//! | `MERCHANT_API_UPSTREAM`  | unset       |
//! | `MERCHANT_OPEN_BROWSER`  | `true`      |

use std::env;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("MERCHANT_PORT must be a port number, got {0:?}")]
    InvalidPort(String),
    #[error("MERCHANT_API_UPSTREAM must be an http(s) URL, got {0:?}")]
    InvalidUpstream(String),
    #[error("MERCHANT_OPEN_BROWSER must be true or false, got {0:?}")]
    InvalidFlag(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL the `/api` routes are forwarded to, without trailing slash.
    pub api_upstream: Option<String>,
    pub open_browser: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = get("MERCHANT_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("MERCHANT_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let api_upstream = match get("MERCHANT_API_UPSTREAM") {
            Some(raw) if raw.starts_with("http://") || raw.starts_with("https://") => {
                Some(raw.trim_end_matches('/').to_string())
            }
            Some(raw) => return Err(ConfigError::InvalidUpstream(raw)),
            None => None,
        };
        let open_browser = match get("MERCHANT_OPEN_BROWSER").map(|v| v.to_lowercase()) {
            None => true,
            Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
            Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
            Some(v) => return Err(ConfigError::InvalidFlag(v)),
        };

        Ok(Self {
            host,
            port,
            api_upstream,
            open_browser,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
