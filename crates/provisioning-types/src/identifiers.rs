//! Type-safe identifiers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ProvisionError, Result};

static DNS1123_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

/// Maximum length of a DNS-1123 label.
pub const MAX_LABEL_LEN: usize = 63;

/// A validated namespace name.
///
/// Namespaces are DNS-1123 labels:
/// - At most 63 characters
/// - Only lowercase letters, digits, and hyphens
/// - Start and end with a letter or digit
///
/// # Example
///
/// ```
/// use provisioning_types::Namespace;
///
/// let ns = Namespace::new("openshift-machine-api").unwrap();
/// assert_eq!(ns.as_str(), "openshift-machine-api");
///
/// assert!(Namespace::new("Machine-API").is_err());
/// assert!(Namespace::new("-api").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Create a new validated namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a DNS-1123 label.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        if !Self::is_valid(name) {
            return Err(ProvisionError::Validation(format!(
                "Invalid namespace '{}': must be at most {} lowercase letters, digits, or hyphens, \
                starting and ending with a letter or digit",
                name, MAX_LABEL_LEN
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// Check if a name is valid without allocating.
    pub fn is_valid(name: &str) -> bool {
        name.len() <= MAX_LABEL_LEN && DNS1123_LABEL.is_match(name)
    }

    /// Get the namespace as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Namespace {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Namespace {
    type Error = ProvisionError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_namespace_validation() {
        assert!(Namespace::new("openshift-machine-api").is_ok());
        assert!(Namespace::new("metal3").is_ok());
        assert!(Namespace::new("a").is_ok());

        assert!(Namespace::new("").is_err());
        assert!(Namespace::new("Metal3").is_err());
        assert!(Namespace::new("metal3-").is_err());
        assert!(Namespace::new("metal3.io").is_err());
        assert!(Namespace::new("a".repeat(64)).is_err());
    }

    #[test]
    fn test_namespace_serde() {
        let ns: Namespace = serde_json::from_str("\"metal3\"").unwrap();
        assert_eq!(ns.as_str(), "metal3");
        assert!(serde_json::from_str::<Namespace>("\"Not_Valid\"").is_err());
    }

    proptest! {
        #[test]
        fn test_valid_labels_accepted(name in "[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?") {
            prop_assert!(Namespace::is_valid(&name));
        }

        #[test]
        fn test_uppercase_rejected(name in "[A-Z][a-z]{0,10}") {
            prop_assert!(!Namespace::is_valid(&name));
        }
    }
}
