//! Server Configuration
//!
//! Configuration management for the BlockVault analyze server.
//! Supports environment variables, config files, and CLI arguments.

use blockvault_extraction::ExtractorConfig;
use blockvault_types::SchemaVariant;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Extraction pipeline configuration
    #[serde(default)]
    pub extraction: ExtractionSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Load configuration from an optional file plus `BLOCKVAULT__*`
    /// environment overrides
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("BLOCKVAULT").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Development defaults: local bind, debug logging
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
            ..Default::default()
        }
    }
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Get the shutdown timeout duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Extraction pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSettings {
    /// Schema variant to extract (proof_target, scored, chain_agnostic)
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Bound on primary-then-fallback cycles
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between cycles in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Per-call timeout in seconds
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,

    /// Whole-extraction deadline in seconds
    #[serde(default = "default_overall_deadline")]
    pub overall_deadline_secs: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            attempt_timeout_secs: default_attempt_timeout(),
            overall_deadline_secs: default_overall_deadline(),
        }
    }
}

impl ExtractionSettings {
    /// Convert to the pipeline's config type
    pub fn to_extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            schema: SchemaVariant::from_str(&self.schema).unwrap_or_default(),
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
            overall_deadline: Duration::from_secs(self.overall_deadline_secs),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_schema() -> String {
    SchemaVariant::default().to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_attempt_timeout() -> u64 {
    30
}

fn default_overall_deadline() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
