// Configuration module entry point
// Loads settings from config file and environment, and holds runtime state

mod state;
mod types;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LogFormat, LoggingConfig, StoreBackend, StoreConfig};

/// Environment variable naming the backing table
pub const TABLE_NAME_ENV: &str = "TABLE_NAME";

/// Environment variable overriding the config file path
pub const CONFIG_PATH_ENV: &str = "TODO_CONFIG";

impl Config {
    /// Load configuration from `TODO_CONFIG` (default "config", extension optional)
    pub fn load() -> Result<Self, ConfigError> {
        // Path override from the environment, else ./config.{toml,json,yaml,...}
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config".to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: defaults, the file, `TODO__*`
    /// variables (`__` separates sections), then `TABLE_NAME`.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        // The file is optional; defaults plus TABLE_NAME are enough to start
        let builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("TODO").separator("__"));
        Self::build(builder, std::env::var(TABLE_NAME_ENV).ok())
    }

    fn build(
        builder: ConfigBuilder<DefaultState>,
        table_name: Option<String>,
    ) -> Result<Self, ConfigError> {
        // Defaults sit below every other source
        let mut builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .set_default("logging.access_log", true)?
            .set_default("performance.connection_timeout", 30)?
            .set_default("performance.max_body_size", 1_048_576)? // 1MB
            .set_default("store.table_name", "")?
            .set_default("store.backend", "dynamodb")?;

        // A non-blank TABLE_NAME beats both the file and TODO__STORE__TABLE_NAME
        if let Some(table) = table_name.filter(|t| !t.trim().is_empty()) {
            builder = builder.set_override("store.table_name", table)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;

        // Table name is the one setting without a usable default
        if cfg.store.table_name.trim().is_empty() {
            return Err(ConfigError::Message(format!(
                "{TABLE_NAME_ENV} is required (or store.table_name in the config file)"
            )));
        }
        Ok(cfg)
    }

    /// Parse `server.host:server.port` into a bind address
    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
