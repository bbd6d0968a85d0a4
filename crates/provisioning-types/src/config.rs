//! Configuration types and structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::enums::{LogFormat, LogLevel};

/// Secrets store connection configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Kubernetes API server URL; derived from the in-cluster environment when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_server: Option<String>,
    /// Bearer token (takes precedence over `token_file`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Path to a file holding the bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
    /// Path to a PEM bundle used to verify the API server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<PathBuf>,
    /// Whether to skip TLS verification (insecure)
    #[serde(default)]
    pub insecure: bool,
}

/// Log configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log file path; stderr when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Log level for this output
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    /// Log format (pretty, json, compact)
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: None,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
