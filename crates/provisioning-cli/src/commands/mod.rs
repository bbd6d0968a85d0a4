//! CLI command implementations.

pub mod ensure;
pub mod status;
pub mod kinds;

use anyhow::{Context, Result};
use provisioning_core::BootstrapConfig;
use provisioning_secrets::SecretKind;
use provisioning_services::{KubeConfig, KubeSecretsClient, MemoryStore};
use provisioning_types::{LogLevel, Namespace, SecretsStore};
use std::sync::Arc;

use crate::cli::Cli;

/// Resolve the configuration: file and environment first, then flags.
pub fn load_config(cli: &Cli) -> Result<BootstrapConfig> {
    let mut config = BootstrapConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(namespace) = &cli.namespace {
        config.namespace = Namespace::new(namespace)?;
    }
    if let Some(api_server) = &cli.api_server {
        config.store.api_server = Some(api_server.clone());
    }
    if cli.insecure {
        config.store.insecure = true;
    }

    config.logs.level = match cli.verbose {
        0 => config.logs.level,
        1 => config.logs.level.max(LogLevel::Debug),
        _ => LogLevel::Trace,
    };

    Ok(config)
}

/// Open the secrets store described by `config`.
pub fn open_store(config: &BootstrapConfig, dry_run: bool) -> Result<Arc<dyn SecretsStore>> {
    if dry_run {
        return Ok(Arc::new(MemoryStore::new()));
    }

    let kube = KubeConfig::from_store_config(&config.store)
        .context("Failed to configure the Kubernetes client")?;
    tracing::debug!("Using API server {}", kube.api_server);

    Ok(Arc::new(KubeSecretsClient::new(kube)?))
}

/// Kinds selected on the command line, or every kind.
pub fn selected(kinds: &[SecretKind]) -> Vec<SecretKind> {
    if kinds.is_empty() {
        SecretKind::ALL.to_vec()
    } else {
        kinds.to_vec()
    }
}
