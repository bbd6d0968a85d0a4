//! # Provisioning Types
//!
//! Core types, traits, and errors shared across the provisioning crates.
//!
//! This crate provides:
//!
//! - A validated namespace identifier
//! - The [`SecretRecord`] exchanged with secret stores
//! - The [`SecretsStore`] trait implemented by store backends
//! - Error types and result aliases
//!
//! ## Example
//!
//! ```
//! use provisioning_types::{Namespace, SecretRecord};
//!
//! let ns = Namespace::new("openshift-machine-api").unwrap();
//! let record = SecretRecord::new(ns.as_str(), "metal3-mariadb-password")
//!     .with_field("password", "example");
//! assert_eq!(record.get("password"), Some("example"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod identifiers;
pub mod enums;
pub mod record;
pub mod traits;
pub mod config;

// Re-export common types for convenience
pub use errors::{ProvisionError, Result, StoreError};
pub use identifiers::Namespace;
pub use enums::{LogFormat, LogLevel};
pub use record::SecretRecord;
pub use traits::SecretsStore;
