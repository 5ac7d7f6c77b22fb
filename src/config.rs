//! Server configuration from environment variables
//!
//! | Variable            | Default          |
//! |---------------------|------------------|
//! | `LRS_BIND_ADDR`     | `127.0.0.1:8080` |
//! | `LRS_DATA_DIR`      | unset (memory)   |
//! | `LRS_PAGE_SIZE`     | `100`            |
//! | `LRS_MAX_PAGE_SIZE` | `1000`           |
//! | `LRS_AUTHORITY`     | unset            |
//! | `LRS_LOG_LEVEL`     | `info`           |

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::service::ServiceOptions;
use crate::store::JsonlStoreConfig;

/// A configuration value could not be used
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the LRS server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrsConfig {
    pub bind_addr: SocketAddr,
    /// Directory for `statements.jsonl`; `None` keeps statements in memory
    pub data_dir: Option<PathBuf>,
    pub page_size: usize,
    pub max_page_size: usize,
    pub authority: Option<String>,
    pub log_level: String,
}

impl Default for LrsConfig {
    fn default() -> Self {
        let options = ServiceOptions::default();
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_dir: None,
            page_size: options.page_size,
            max_page_size: options.max_page_size,
            authority: None,
            log_level: "info".to_string(),
        }
    }
}

impl LrsConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_lookup(&current_dir, |key| env::var(key).ok())
    }

    /// Read configuration through `lookup`; relative data dirs resolve against `base_dir`
    pub fn from_lookup<F>(base_dir: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match get("LRS_BIND_ADDR") {
            Some(value) => value
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "LRS_BIND_ADDR",
                    value: value.clone(),
                    reason: e.to_string(),
                })?,
            None => defaults.bind_addr,
        };

        let data_dir = get("LRS_DATA_DIR").map(|dir| {
            let path = PathBuf::from(dir);
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        });

        let page_size = parse_size("LRS_PAGE_SIZE", get("LRS_PAGE_SIZE"), defaults.page_size)?;
        let max_page_size =
            parse_size("LRS_MAX_PAGE_SIZE", get("LRS_MAX_PAGE_SIZE"), defaults.max_page_size)?;
        if page_size > max_page_size {
            return Err(ConfigError::InvalidValue {
                key: "LRS_PAGE_SIZE",
                value: page_size.to_string(),
                reason: format!("exceeds LRS_MAX_PAGE_SIZE ({})", max_page_size),
            });
        }

        Ok(Self {
            bind_addr,
            data_dir,
            page_size,
            max_page_size,
            authority: get("LRS_AUTHORITY"),
            log_level: get("LRS_LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Options for the statement service
    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            page_size: self.page_size,
            max_page_size: self.max_page_size,
            authority: self.authority.clone(),
            ..Default::default()
        }
    }

    /// File store configuration, when a data directory is set
    pub fn store_config(&self) -> Option<JsonlStoreConfig> {
        self.data_dir.as_ref().map(JsonlStoreConfig::new)
    }
}

fn parse_size(key: &'static str, value: Option<String>, default: usize) -> Result<usize, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(size) => Ok(size),
        Err(e) => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: e.to_string(),
        }),
    }
}
