//! CLI structure and command definitions.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use provisioning_core::{BootstrapConfig, APP_NAME, VERSION};
use provisioning_secrets::SecretKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version = VERSION)]
#[command(about = "Create the bare-metal provisioning service secrets if they are missing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Target namespace
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Kubernetes API server URL
    #[arg(long, global = true)]
    pub api_server: Option<String>,

    /// Skip TLS verification of the API server
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create missing secrets
    Ensure {
        /// Only these kinds (all if not specified)
        #[arg(short, long = "kind", value_parser = parse_kind)]
        kinds: Vec<SecretKind>,

        /// Run against an empty in-memory store instead of the cluster
        #[arg(long)]
        dry_run: bool,
    },

    /// Show which secrets exist
    Status {
        /// Only these kinds (all if not specified)
        #[arg(short, long = "kind", value_parser = parse_kind)]
        kinds: Vec<SecretKind>,
    },

    /// List the managed secrets and their fields
    Kinds,
}

fn parse_kind(s: &str) -> std::result::Result<SecretKind, String> {
    s.parse().map_err(|e: provisioning_types::ProvisionError| e.to_string())
}

impl Cli {
    pub async fn execute(&self, config: &BootstrapConfig) -> Result<()> {
        use crate::commands::*;

        match &self.command {
            Commands::Ensure { kinds, dry_run } => {
                ensure::execute(config, kinds, *dry_run).await
            }
            Commands::Status { kinds } => {
                status::execute(config, kinds).await
            }
            Commands::Kinds => {
                kinds::execute()
            }
        }
    }
}
