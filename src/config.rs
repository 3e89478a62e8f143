use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::engine::DEFAULT_HISTORY_LIMIT;

pub const DEFAULT_CONFIG_FILE: &str = "watchful.toml";

/// Main configuration structure for Watchful
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchfulConfig {
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Settings shared by every workflow engine
    pub workflow: WorkflowConfig,
    /// Alert composer settings
    pub alert: AlertConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Transition records kept per workflow instance
    pub history_limit: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Period of the renderer's pulse while an alert is out
    pub pulse_period_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            pulse_period_ms: 1600,
        }
    }
}

impl AlertConfig {
    pub fn pulse_period(&self) -> Duration {
        Duration::from_millis(self.pulse_period_ms)
    }
}

impl WatchfulConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`watchful.toml` unless `path` is given)
    /// 3. Environment variables (`WATCHFUL_` prefix, `__` between sections)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if Path::new(DEFAULT_CONFIG_FILE).exists() {
                    builder = builder.add_source(File::with_name("watchful"));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("WATCHFUL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let watchful_config: WatchfulConfig = config.try_deserialize()?;
        Ok(watchful_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load .env file if it exists. Returns whether one was read.
    pub fn load_env_file() -> Result<bool> {
        if !Path::new(".env").exists() {
            return Ok(false);
        }
        dotenvy::dotenv()?;
        Ok(true)
    }
}
