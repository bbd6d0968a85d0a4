//! # Provisioning Secrets
//!
//! Idempotent bootstrap of the service password secrets used by the
//! bare-metal provisioning services.
//!
//! Three secrets are managed:
//! - The MariaDB password
//! - Ironic API credentials (with htpasswd and auth-config fields)
//! - Ironic inspector credentials (same shape)
//!
//! Each is created at most once. An existing secret is never read beyond an
//! existence check and never overwritten.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run(store: std::sync::Arc<dyn provisioning_types::SecretsStore>) -> provisioning_types::Result<()> {
//! use provisioning_secrets::SecretPlan;
//! use provisioning_types::Namespace;
//!
//! let namespace = Namespace::new("openshift-machine-api")?;
//! let report = SecretPlan::new(store, namespace).ensure_all().await?;
//! println!("created {} secrets", report.created().len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod password;
pub mod htpasswd;
pub mod kinds;
pub mod provisioner;
pub mod plan;

pub use password::{generate_password, Password};
pub use htpasswd::{auth_config, derive_hash, HtpasswdEntry};
pub use kinds::{SecretKind, SecretLayout, SecretSpec, SECRET_SPECS};
pub use provisioner::{
    ensure_inspector_secret, ensure_ironic_secret, ensure_mariadb_secret, ensure_secret,
    Provisioned,
};
pub use plan::{ProvisionReport, SecretPlan};
