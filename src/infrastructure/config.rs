//! Application configuration
//!
//! Layered with the `config` crate, lowest precedence first:
//! built-in defaults, an optional `config.{json,toml,yaml}` file, then
//! `GOT__*` environment variables (`GOT__SERVER__PORT=8080`).

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment name ("local", "production", ...)
    pub env: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database URL used for writes
    pub writer: String,
    /// Database URL used for reads; defaults to `writer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reader: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: "local".to_string(),
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                backend: StorageBackend::Sqlite,
                writer: "sqlite:data/got.db".to_string(),
                reader: None,
                max_connections: 5,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration, reading the file named by `GOT_CONFIG` (default `config`)
    pub fn from_env() -> Result<Self> {
        let path = env::var("GOT_CONFIG").unwrap_or_else(|_| "config".to_string());
        Self::load(&path)
    }

    /// Load configuration from an optional file (extension inferred) plus the environment
    pub fn load(path: &str) -> Result<Self> {
        let defaults = config::Config::try_from(&AppConfig::default())
            .context("Failed to build default configuration")?;

        config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("GOT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .context("server.host/server.port must form a valid socket address")
    }
}

impl StorageConfig {
    pub fn reader_url(&self) -> &str {
        self.reader.as_deref().unwrap_or(&self.writer)
    }
}
