//! The secret record exchanged with a secrets store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A named, namespaced key-value secret.
///
/// Values are UTF-8 strings. `Debug` lists the keys only, so records can be
/// traced without leaking their contents.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    /// Secret name
    pub name: String,
    /// Namespace the secret lives in
    pub namespace: String,
    /// Field key to value
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl SecretRecord {
    /// Create an empty record.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            data: BTreeMap::new(),
        }
    }

    /// Add a field, replacing any previous value for the key.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Get a field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Field keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRecord")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_get() {
        let record = SecretRecord::new("metal3", "db")
            .with_field("password", "s3cret")
            .with_field("username", "root");

        assert_eq!(record.get("password"), Some("s3cret"));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.keys(), vec!["password", "username"]);
    }

    #[test]
    fn test_debug_hides_values() {
        let record = SecretRecord::new("metal3", "db").with_field("password", "hunter2hunter2");
        let debug = format!("{:?}", record);
        assert!(debug.contains("password"));
        assert!(!debug.contains("hunter2hunter2"));
    }
}
