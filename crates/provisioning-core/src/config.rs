//! Configuration management.
//!
//! ## Configuration Layers
//!
//! Configuration values are resolved in this priority order:
//! 1. Environment variables
//! 2. Programmatically set values
//! 3. Values loaded from file
//! 4. Default values
//!
//! ## Example
//!
//! ```no_run
//! use provisioning_core::config::BootstrapConfig;
//!
//! let config = BootstrapConfig::load(Some("/etc/provisioning/bootstrap.yml".as_ref()))?;
//! println!("provisioning into {}", config.namespace);
//! # Ok::<(), provisioning_types::ProvisionError>(())
//! ```

use crate::util::data::{deep_merge, get_path, load_yaml_file, set_path};
use provisioning_types::config::{LogConfig, StoreConfig};
use provisioning_types::{Namespace, ProvisionError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Namespace the provisioning services run in by default.
pub const DEFAULT_NAMESPACE: &str = "openshift-machine-api";

/// Environment variables recognised as overrides, with their config paths.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PROVISIONING_NAMESPACE", "namespace"),
    ("PROVISIONING_API_SERVER", "store.api_server"),
    ("PROVISIONING_TOKEN_FILE", "store.token_file"),
    ("PROVISIONING_CA_FILE", "store.ca_file"),
    ("PROVISIONING_INSECURE", "store.insecure"),
    ("PROVISIONING_LOG_LEVEL", "logs.level"),
    ("PROVISIONING_LOG_FORMAT", "logs.format"),
];

/// Configuration layer priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLayer {
    /// Default values
    Default = 0,
    /// Values loaded from file
    Loaded = 1,
    /// Values set programmatically
    Set = 2,
    /// Values from environment variables
    Environment = 3,
}

impl ConfigLayer {
    /// All layers, lowest priority first.
    pub const ASCENDING: [ConfigLayer; 4] = [
        ConfigLayer::Default,
        ConfigLayer::Loaded,
        ConfigLayer::Set,
        ConfigLayer::Environment,
    ];
}

/// Layered configuration values.
#[derive(Clone, Debug, Default)]
pub struct Config {
    layers: HashMap<ConfigLayer, Value>,
}

impl Config {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from a file path.
    ///
    /// If the file doesn't exist, an empty configuration is created.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::new();

        if path.exists() {
            let value = load_yaml_file(path).map_err(|e| {
                ProvisionError::Config(format!("Failed to load config {}: {}", path.display(), e))
            })?;
            if !value.is_object() {
                return Err(ProvisionError::Config(format!(
                    "Config {} must be a mapping",
                    path.display()
                )));
            }
            tracing::debug!("Loaded config from {}", path.display());
            config.layers.insert(ConfigLayer::Loaded, value);
        }

        Ok(config)
    }

    /// Replace the defaults layer.
    pub fn with_defaults(mut self, defaults: impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(defaults)?;
        self.layers.insert(ConfigLayer::Default, value);
        Ok(self)
    }

    /// Fill the environment layer from `(name, value)` pairs.
    ///
    /// Only names listed in [`ENV_OVERRIDES`] are used. Values are parsed as
    /// YAML scalars so `true` becomes a boolean.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut layer = Value::Object(Default::default());

        for (name, raw) in vars {
            let Some((_, path)) = ENV_OVERRIDES.iter().find(|(var, _)| *var == name.as_ref()) else {
                continue;
            };
            let value = match serde_yaml::from_str::<Value>(raw.as_ref()) {
                Ok(Value::Bool(b)) => Value::Bool(b),
                _ => Value::String(raw.as_ref().to_string()),
            };
            set_path(&mut layer, path, value)?;
        }

        self.layers.insert(ConfigLayer::Environment, layer);
        Ok(self)
    }

    /// Fill the environment layer from the process environment.
    pub fn with_process_env(self) -> Result<Self> {
        self.with_env(std::env::vars())
    }

    /// Get a configuration value by key, respecting layer priority.
    ///
    /// Returns None if the key doesn't exist in any layer.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        ConfigLayer::ASCENDING
            .iter()
            .rev()
            .filter_map(|layer| self.layers.get(layer))
            .filter_map(|data| get_path(data, key))
            .find_map(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Set a configuration value programmatically.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| ProvisionError::Config(format!("Failed to serialize value: {}", e)))?;

        let set_layer = self
            .layers
            .entry(ConfigLayer::Set)
            .or_insert_with(|| Value::Object(Default::default()));

        set_path(set_layer, key, value)
    }

    /// Get merged data from all layers.
    pub fn merged_data(&self) -> Value {
        ConfigLayer::ASCENDING
            .iter()
            .filter_map(|layer| self.layers.get(layer))
            .fold(Value::Object(Default::default()), |merged, layer| {
                deep_merge(merged, layer.clone())
            })
    }

    /// Deserialize the merged layers.
    pub fn extract<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        serde_json::from_value(self.merged_data())
            .map_err(|e| ProvisionError::Config(format!("Failed to parse config: {}", e)))
    }
}

/// Settings for one bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Namespace the secrets are created in
    pub namespace: Namespace,

    /// Secrets store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Log output
    #[serde(default)]
    pub logs: LogConfig,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            namespace: Namespace::new(DEFAULT_NAMESPACE).expect("default namespace is valid"),
            store: StoreConfig::default(),
            logs: LogConfig::default(),
        }
    }
}

impl BootstrapConfig {
    /// Load from an optional file, then apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::layered(path)?.with_process_env()?.extract()
    }

    /// Defaults plus the optional file, without environment overrides.
    pub fn layered(path: Option<&Path>) -> Result<Config> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ProvisionError::Config(format!(
                        "Config file {} does not exist",
                        path.display()
                    )));
                }
                Config::load(path)?
            }
            None => Config::new(),
        };

        config.with_defaults(Self::default())
    }
}
