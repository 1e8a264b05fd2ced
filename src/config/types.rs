// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::fmt;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub store: StoreConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "todo_handler=debug"; `RUST_LOG` wins when set
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    pub access_log: bool,
}

/// Log output format
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Upper bound for one connection, in seconds
    pub connection_timeout: u64,
    /// Largest accepted request body, in bytes
    pub max_body_size: u64,
}

/// Item store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Backing table (collection) name
    pub table_name: String,
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override, e.g. `http://localhost:8000` for dynamodb-local
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Store backend selection
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    #[serde(rename = "dynamodb")]
    DynamoDb,
    #[serde(rename = "memory")]
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DynamoDb => write!(f, "dynamodb"),
            Self::Memory => write!(f, "memory"),
        }
    }
}
