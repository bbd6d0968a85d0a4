//! Core trait definitions.

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::record::SecretRecord;

/// Trait for secret storage backends.
///
/// Implementers provide access to a namespaced secret store such as the
/// Kubernetes API. The store's `create` must be atomic: of two concurrent
/// creates for the same name, exactly one succeeds and the other reports
/// [`StoreError::Conflict`].
#[async_trait]
pub trait SecretsStore: Send + Sync {
    /// Read a secret.
    ///
    /// Returns [`StoreError::NotFound`] if no secret with that name exists.
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretRecord, StoreError>;

    /// Create a secret from a fully populated record.
    ///
    /// Returns [`StoreError::Conflict`] if the name is already taken. Never
    /// overwrites.
    async fn create(&self, record: &SecretRecord) -> Result<(), StoreError>;

    /// Short backend name for log lines (e.g., "kubernetes", "memory").
    fn backend(&self) -> &'static str;
}
