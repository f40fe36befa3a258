//! Server configuration
//!
//! Everything has a default, so the server runs with no config file at all.
//! A config.toml next to the binary overrides individual fields.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::ModelConfig;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub network: NetworkConfig,
    pub model: ModelConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Number of embed requests processed at once. The default of 1 keeps
    /// requests strictly serial in arrival order.
    pub max_in_flight: usize,
    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_in_flight: 1,
            max_body_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file if it exists, defaults otherwise
    pub fn from_file_or_default<P: AsRef<Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.network
            .bind_address
            .parse::<std::net::SocketAddr>()
            .map_err(|e| format!("Invalid bind address '{}': {}", self.network.bind_address, e))?;

        if self.network.max_in_flight == 0 {
            return Err("max_in_flight must be at least 1".into());
        }

        if self.network.max_body_bytes == 0 {
            return Err("max_body_bytes must be greater than zero".into());
        }

        self.model.validate()?;

        Ok(())
    }
}
