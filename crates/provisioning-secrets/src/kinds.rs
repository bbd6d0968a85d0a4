//! The fixed table of managed secrets.

use provisioning_types::{ProvisionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key holding the plaintext password.
pub const PASSWORD_KEY: &str = "password";
/// Key holding the service account username.
pub const USERNAME_KEY: &str = "username";
/// Key holding the `username:hash` htpasswd line.
pub const HTPASSWD_KEY: &str = "htpasswd";
/// Key holding the basic-auth INI block.
pub const AUTH_CONFIG_KEY: &str = "auth-config";

/// Field layout of a managed secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretLayout {
    /// A single `password` field
    Password,
    /// Service account credentials plus derived htpasswd and auth-config fields
    BasicAuth {
        /// Service account username
        username: &'static str,
        /// Section header of the auth-config block
        section: &'static str,
    },
}

impl SecretLayout {
    /// Keys written for this layout, in sorted order.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            SecretLayout::Password => &[PASSWORD_KEY],
            SecretLayout::BasicAuth { .. } => {
                &[AUTH_CONFIG_KEY, HTPASSWD_KEY, PASSWORD_KEY, USERNAME_KEY]
            }
        }
    }
}

/// Name and layout of one managed secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretSpec {
    /// Which kind this entry describes
    pub kind: SecretKind,
    /// Secret name in the target namespace
    pub name: &'static str,
    /// Fields written on creation
    pub layout: SecretLayout,
}

/// The managed secrets, in provisioning order.
pub static SECRET_SPECS: [SecretSpec; 3] = [
    SecretSpec {
        kind: SecretKind::Mariadb,
        name: "metal3-mariadb-password",
        layout: SecretLayout::Password,
    },
    SecretSpec {
        kind: SecretKind::Ironic,
        name: "metal3-ironic-password",
        layout: SecretLayout::BasicAuth {
            username: "ironic-user",
            section: "ironic",
        },
    },
    SecretSpec {
        kind: SecretKind::Inspector,
        name: "metal3-ironic-inspector-password",
        layout: SecretLayout::BasicAuth {
            username: "inspector-user",
            section: "inspector",
        },
    },
];

/// The kinds of managed secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretKind {
    /// Database password
    Mariadb,
    /// Ironic API credentials
    Ironic,
    /// Ironic inspector credentials
    Inspector,
}

impl SecretKind {
    /// Every kind, in provisioning order.
    pub const ALL: [SecretKind; 3] = [
        SecretKind::Mariadb,
        SecretKind::Ironic,
        SecretKind::Inspector,
    ];

    /// The table entry for this kind.
    pub fn spec(self) -> &'static SecretSpec {
        match self {
            SecretKind::Mariadb => &SECRET_SPECS[0],
            SecretKind::Ironic => &SECRET_SPECS[1],
            SecretKind::Inspector => &SECRET_SPECS[2],
        }
    }

    /// Secret name for this kind.
    pub fn secret_name(self) -> &'static str {
        self.spec().name
    }

    /// Lowercase identifier used on the command line and in config.
    pub fn as_str(self) -> &'static str {
        match self {
            SecretKind::Mariadb => "mariadb",
            SecretKind::Ironic => "ironic",
            SecretKind::Inspector => "inspector",
        }
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretKind {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mariadb" => Ok(SecretKind::Mariadb),
            "ironic" => Ok(SecretKind::Ironic),
            "inspector" => Ok(SecretKind::Inspector),
            _ => Err(ProvisionError::Validation(format!(
                "Unknown secret kind '{}': expected mariadb, ironic, or inspector",
                s
            ))),
        }
    }
}
