//! `status` command: report which secrets exist.

use anyhow::{Context, Result};
use colored::Colorize;
use provisioning_core::BootstrapConfig;
use provisioning_secrets::{SecretKind, SecretPlan};

use super::{open_store, selected};

pub async fn execute(config: &BootstrapConfig, kinds: &[SecretKind]) -> Result<()> {
    let store = open_store(config, false)?;
    let plan = SecretPlan::new(store, config.namespace.clone()).with_kinds(&selected(kinds));

    let present = plan
        .check()
        .await
        .with_context(|| format!("Failed to read secrets in namespace {}", config.namespace))?;

    println!("{}", format!("Namespace {}", config.namespace).bold());
    for (kind, exists) in &present {
        let status = if *exists { "present".green() } else { "missing".red() };
        println!("  {:<34} {}", kind.secret_name(), status);
    }

    Ok(())
}
