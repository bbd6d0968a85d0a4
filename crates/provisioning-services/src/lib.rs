//! # Provisioning Services
//!
//! Secrets store backends for provisioning bootstrap.
//!
//! This crate provides:
//! - **Kubernetes**: async client for the core/v1 Secrets API
//! - **Memory**: in-process store for tests and dry runs

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kube;
pub mod memory;

pub use kube::{KubeConfig, KubeSecretsClient};
pub use memory::MemoryStore;
