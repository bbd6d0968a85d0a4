//! Provisioning secrets entry point.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use provisioning_core::log;

mod cli;
mod commands;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = commands::load_config(cli)?;
    let _guard = log::init(&config.logs)?;
    cli.execute(&config).await
}
