//! In-process secrets store.

use async_trait::async_trait;
use provisioning_types::{SecretRecord, SecretsStore, StoreError};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Secrets store held in memory.
///
/// `create` takes the write lock for the existence check and the insert, so
/// concurrent creates of one name yield exactly one success.
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: RwLock<HashMap<(String, String), SecretRecord>>,
    creates: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets.
    pub async fn len(&self) -> usize {
        self.secrets.read().await.len()
    }

    /// Whether the store holds no secrets.
    pub async fn is_empty(&self) -> bool {
        self.secrets.read().await.is_empty()
    }

    /// Number of successful creates since the store was built.
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretsStore for MemoryStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretRecord, StoreError> {
        self.secrets
            .read()
            .await
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn create(&self, record: &SecretRecord) -> Result<(), StoreError> {
        let mut secrets = self.secrets.write().await;

        match secrets.entry((record.namespace.clone(), record.name.clone())) {
            Entry::Occupied(_) => Err(StoreError::Conflict {
                namespace: record.namespace.clone(),
                name: record.name.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                self.creates.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
