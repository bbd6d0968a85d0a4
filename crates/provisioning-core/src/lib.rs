//! # Provisioning Core
//!
//! Configuration and logging for the provisioning secrets bootstrap.
//!
//! This crate provides:
//!
//! - **Configuration**: layered configuration (defaults, file, programmatic, environment)
//! - **Logging**: `tracing` setup with pretty, compact, or JSON output
//! - **Data utilities**: YAML loading, deep merging, dotted-path access
//!
//! ## Example
//!
//! ```no_run
//! use provisioning_core::{config::BootstrapConfig, log};
//!
//! let config = BootstrapConfig::load(None)?;
//! let _guard = log::init(&config.logs)?;
//! # Ok::<(), provisioning_types::ProvisionError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod log;
pub mod util;

// Re-export commonly used items
pub use config::{BootstrapConfig, Config};
pub use provisioning_types::{ProvisionError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "provisioning-secrets";
