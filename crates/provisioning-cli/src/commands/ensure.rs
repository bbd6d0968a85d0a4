//! `ensure` command: create any missing secrets.

use anyhow::{Context, Result};
use colored::Colorize;
use provisioning_core::BootstrapConfig;
use provisioning_secrets::{Provisioned, SecretKind, SecretPlan};

use super::{open_store, selected};

pub async fn execute(config: &BootstrapConfig, kinds: &[SecretKind], dry_run: bool) -> Result<()> {
    let store = open_store(config, dry_run)?;
    let kinds = selected(kinds);

    if dry_run {
        println!("{}", "Dry run: using an empty in-memory store".yellow());
    }
    tracing::info!(
        "Ensuring {} secret(s) in namespace {} via {}",
        kinds.len(),
        config.namespace,
        store.backend()
    );

    let plan = SecretPlan::new(store, config.namespace.clone()).with_kinds(&kinds);
    let report = plan
        .ensure_all()
        .await
        .with_context(|| format!("Failed to provision secrets in namespace {}", config.namespace))?;

    println!("{}", format!("Namespace {}", report.namespace).bold());
    for (kind, outcome) in &report.outcomes {
        let status = match outcome {
            Provisioned::Created => outcome.as_str().green(),
            Provisioned::AlreadyExists => outcome.as_str().normal(),
            Provisioned::CreateConflict => outcome.as_str().yellow(),
        };
        println!("  {:<34} {}", kind.secret_name(), status);
    }

    let created = report.created().len();
    if created == 0 {
        println!("{}", "All secrets already present".dimmed());
    } else {
        println!("{}", format!("{} secret(s) created", created).green().bold());
    }

    Ok(())
}
