//! `kinds` command: list the managed secrets.

use anyhow::Result;
use colored::Colorize;
use provisioning_secrets::{SecretLayout, SECRET_SPECS};

pub fn execute() -> Result<()> {
    for spec in SECRET_SPECS.iter() {
        println!("{:<10} {}", spec.kind.as_str().cyan().bold(), spec.name);
        if let SecretLayout::BasicAuth { username, .. } = spec.layout {
            println!("{:<10} user: {}", "", username);
        }
        println!("{:<10} keys: {}", "", spec.layout.keys().join(", "));
    }
    Ok(())
}
