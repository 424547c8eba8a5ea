//! Configuration management
//!
//! Loads `config.toml` with `TOKEN_FORGE_*` environment overrides. Every
//! value has a documented default, so a missing configuration file is not an
//! error; loading only fails on a malformed file or an invalid value.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub template: TemplateConfig,
    pub toolchain: ToolchainConfig,
    pub rpc: RpcConfig,
    pub cleanup: CleanupConfig,
    pub limiter: LimiterConfig,
}

/// Listen address for the HTTP API
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Location of the pristine token contract template project
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TemplateConfig {
    pub path: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: "./templates/token_template".to_string(),
        }
    }
}

/// External Move build toolchain
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Install directory, checked for existence at startup
    pub directory: String,
    /// Path to the build binary
    pub binary_path: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            directory: "/usr/local/bfc".to_string(),
            binary_path: "/usr/local/bfc/bfc".to_string(),
        }
    }
}

/// Upstream JSON-RPC endpoint publish requests are relayed to
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RpcConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub retry_count: u32,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://rpc.benfen.org".to_string(),
            timeout_secs: 30,
            retry_count: 3,
        }
    }
}

/// Retention sweep of ephemeral template working directories
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CleanupConfig {
    pub interval_minutes: u64,
    pub retention_minutes: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 10,
            retention_minutes: 10,
        }
    }
}

/// Per-client admission control policy
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LimiterConfig {
    /// Tokens granted per one-second window
    pub second_tokens: u32,
    /// Tokens granted per one-minute window
    pub minute_tokens: u32,
    /// Entries idle longer than this are evicted from the store
    pub idle_timeout_minutes: u64,
    /// How often the eviction pass runs
    pub eviction_interval_minutes: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            second_tokens: 1,
            minute_tokens: 10,
            idle_timeout_minutes: 10,
            eviction_interval_minutes: 5,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("TOKEN_FORGE").separator("__"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.port == 0 {
            return Err(config::ConfigError::Message(
                "Server port cannot be 0".into(),
            ));
        }

        if self.template.path.is_empty() {
            return Err(config::ConfigError::Message(
                "template.path cannot be empty".into(),
            ));
        }

        if self.rpc.url.is_empty() {
            return Err(config::ConfigError::Message("rpc.url cannot be empty".into()));
        }

        if self.rpc.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "rpc.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.cleanup.interval_minutes == 0 {
            return Err(config::ConfigError::Message(
                "cleanup.interval_minutes must be greater than 0".into(),
            ));
        }

        if self.limiter.second_tokens == 0 || self.limiter.minute_tokens == 0 {
            return Err(config::ConfigError::Message(
                "limiter token allotments must be greater than 0".into(),
            ));
        }

        if self.limiter.eviction_interval_minutes == 0 {
            return Err(config::ConfigError::Message(
                "limiter.eviction_interval_minutes must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

impl HttpConfig {
    /// Get bind address and port as socket address
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl TemplateConfig {
    /// Get the template project directory as PathBuf
    pub fn template_path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

impl RpcConfig {
    /// Get the request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CleanupConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_minutes * 60)
    }
}

impl LimiterConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_minutes * 60)
    }

    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_minutes * 60)
    }
}
