use std::{env, path::PathBuf};

use thiserror::Error;

/// AppConfig
///
/// Holds the client's entire configuration. Immutable once loaded and cloned into
/// the `AppContext`, so every component sees the same base URL and session location.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Origin of the REST backend; request paths are appended to it verbatim.
    pub api_base: String,
    // Where the token and last-known user record are persisted.
    pub session_file: PathBuf,
    // Page size of the admin user table.
    pub admin_page_size: u32,
    // Runtime environment marker. Controls log formatting and required variables.
    pub env: Env,
}

/// Env
///
/// Local runs get defaults for everything; production must name its backend.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{var} is not a valid number: {value}")]
    InvalidNumber { var: &'static str, value: String },
}

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_SESSION_FILE: &str = ".unisocial/session.json";
pub const DEFAULT_ADMIN_PAGE_SIZE: u32 = 10;

impl Default for AppConfig {
    /// default
    ///
    /// Safe values for test scaffolding; no environment access.
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            admin_page_size: DEFAULT_ADMIN_PAGE_SIZE,
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads `APP_ENV`, `API_BASE_URL`, `SESSION_FILE` and `ADMIN_PAGE_SIZE`.
    /// Production refuses to start without an explicit `API_BASE_URL`; local
    /// falls back to a backend on localhost.
    pub fn load() -> Result<Self, ConfigError> {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base = match env {
            Env::Production => {
                env::var("API_BASE_URL").map_err(|_| ConfigError::Missing("API_BASE_URL"))?
            }
            Env::Local => env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
        };

        let session_file = env::var("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_FILE));

        let admin_page_size = match env::var("ADMIN_PAGE_SIZE") {
            Ok(value) => match value.parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "ADMIN_PAGE_SIZE",
                        value,
                    });
                }
            },
            Err(_) => DEFAULT_ADMIN_PAGE_SIZE,
        };

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            session_file,
            admin_page_size,
            env,
        })
    }
}
