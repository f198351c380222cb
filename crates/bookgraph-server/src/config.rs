//! Configuration for the Bookgraph Server
//!
//! This module contains the configuration types and loading functionality.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};

/// Where the graph and summary documents live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageLocation {
    /// In-memory documents, lost on exit
    Memory,
    /// JSON files under a directory
    Directory(PathBuf),
}

impl StorageLocation {
    /// Parse `memory://` or `file://<dir>`
    pub fn parse(url: &str) -> ServerResult<Self> {
        if url.starts_with("memory://") {
            Ok(StorageLocation::Memory)
        } else if let Some(dir) = url.strip_prefix("file://") {
            if dir.is_empty() {
                return Err(ServerError::ConfigError(
                    "file:// storage URL needs a directory".to_string()
                ));
            }
            Ok(StorageLocation::Directory(PathBuf::from(dir)))
        } else {
            Err(ServerError::ConfigError(format!(
                "Unsupported storage URL: {}", url
            )))
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// Storage URL, `memory://` or `file://<dir>`
    #[serde(default = "default_storage_url")]
    pub storage_url: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    2600
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_storage_url() -> String {
    "file://./data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> ServerResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup, starting from defaults
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            } else {
                warn!("Invalid SERVER_PORT value: {}", port);
            }
        }

        if let Some(host) = lookup("SERVER_HOST") {
            config.bind_address = host;
        }

        if let Some(storage_url) = lookup("STORAGE_URL") {
            config.storage_url = storage_url;
        }

        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.log_level = log_level;
        }

        // Validate storage
        let location = config.storage_location()?;
        if location == StorageLocation::Memory {
            warn!("Using in-memory storage - graph and summaries are lost on exit!");
        }

        info!("Loaded server configuration");
        Ok(config)
    }

    pub fn storage_location(&self) -> ServerResult<StorageLocation> {
        StorageLocation::parse(&self.storage_url)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            storage_url: default_storage_url(),
            log_level: default_log_level(),
        }
    }
}
