//! Provisioning plan covering all managed secrets.

use crate::kinds::SecretKind;
use crate::provisioner::{ensure_secret, Provisioned};
use provisioning_types::{Namespace, ProvisionError, Result, SecretsStore};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Outcome of running a [`SecretPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Namespace the plan ran against
    pub namespace: Namespace,
    /// Outcome per kind, in the order the kinds were provisioned
    pub outcomes: Vec<(SecretKind, Provisioned)>,
}

impl ProvisionReport {
    /// Kinds this run created.
    pub fn created(&self) -> Vec<SecretKind> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_created())
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Outcome for one kind, if it was part of the plan.
    pub fn outcome(&self, kind: SecretKind) -> Option<Provisioned> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| *outcome)
    }
}

/// Secret plan for one namespace.
pub struct SecretPlan {
    store: Arc<dyn SecretsStore>,
    namespace: Namespace,
    kinds: Vec<SecretKind>,
}

impl SecretPlan {
    /// Create a plan covering every managed secret.
    pub fn new(store: Arc<dyn SecretsStore>, namespace: Namespace) -> Self {
        Self {
            store,
            namespace,
            kinds: SecretKind::ALL.to_vec(),
        }
    }

    /// Restrict the plan to `kinds`.
    ///
    /// Duplicates are dropped and table order is kept regardless of the order given.
    pub fn with_kinds(mut self, kinds: &[SecretKind]) -> Self {
        self.kinds = SecretKind::ALL
            .into_iter()
            .filter(|kind| kinds.contains(kind))
            .collect();
        self
    }

    /// Kinds covered by this plan.
    pub fn kinds(&self) -> &[SecretKind] {
        &self.kinds
    }

    /// Namespace targeted by this plan.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Check which secrets exist, without creating anything.
    pub async fn check(&self) -> Result<BTreeMap<SecretKind, bool>> {
        let mut results = BTreeMap::new();

        for kind in &self.kinds {
            let name = kind.secret_name();
            let exists = match self.store.get(self.namespace.as_str(), name).await {
                Ok(_) => true,
                Err(e) if e.is_not_found() => false,
                Err(e) => {
                    return Err(ProvisionError::StoreRead {
                        namespace: self.namespace.to_string(),
                        name: name.to_string(),
                        source: e,
                    })
                }
            };
            results.insert(*kind, exists);
        }

        Ok(results)
    }

    /// Ensure every secret in the plan exists.
    ///
    /// Stops at the first fatal error; secrets provisioned before it stay in place.
    pub async fn ensure_all(&self) -> Result<ProvisionReport> {
        tracing::debug!(
            namespace = %self.namespace,
            backend = self.store.backend(),
            kinds = self.kinds.len(),
            "Ensuring provisioning secrets"
        );

        let mut outcomes = Vec::with_capacity(self.kinds.len());
        for kind in &self.kinds {
            let outcome = ensure_secret(self.store.as_ref(), &self.namespace, kind.spec()).await?;
            outcomes.push((*kind, outcome));
        }

        let report = ProvisionReport {
            namespace: self.namespace.clone(),
            outcomes,
        };
        tracing::info!(
            namespace = %self.namespace,
            created = report.created().len(),
            "Provisioning secrets ensured"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use provisioning_services::MemoryStore;
    use provisioning_types::{SecretRecord, StoreError};

    /// Fails reads for one secret name.
    struct DenyOne {
        inner: MemoryStore,
        denied: &'static str,
    }

    #[async_trait]
    impl SecretsStore for DenyOne {
        async fn get(
            &self,
            namespace: &str,
            name: &str,
        ) -> std::result::Result<SecretRecord, StoreError> {
            if name == self.denied {
                return Err(StoreError::Forbidden(format!("cannot get secret {}", name)));
            }
            self.inner.get(namespace, name).await
        }

        async fn create(&self, record: &SecretRecord) -> std::result::Result<(), StoreError> {
            self.inner.create(record).await
        }

        fn backend(&self) -> &'static str {
            "deny-one"
        }
    }

    fn namespace() -> Namespace {
        Namespace::new("metal3").unwrap()
    }

    #[tokio::test]
    async fn test_ensure_all_then_rerun() {
        let store = Arc::new(MemoryStore::new());
        let plan = SecretPlan::new(store.clone(), namespace());

        let first = plan.ensure_all().await.unwrap();
        assert_eq!(first.created(), SecretKind::ALL.to_vec());

        let second = plan.ensure_all().await.unwrap();
        assert!(second.created().is_empty());
        assert_eq!(second.outcome(SecretKind::Ironic), Some(Provisioned::AlreadyExists));
        assert_eq!(store.len().await, 3);
        assert_eq!(store.create_count(), 3);
    }

    #[tokio::test]
    async fn test_with_kinds_keeps_table_order() {
        let store = Arc::new(MemoryStore::new());
        let plan = SecretPlan::new(store.clone(), namespace())
            .with_kinds(&[SecretKind::Inspector, SecretKind::Mariadb, SecretKind::Inspector]);

        assert_eq!(plan.kinds(), &[SecretKind::Mariadb, SecretKind::Inspector]);

        let report = plan.ensure_all().await.unwrap();
        assert_eq!(report.outcome(SecretKind::Ironic), None);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_check_reports_presence() {
        let store = Arc::new(MemoryStore::new());
        let plan = SecretPlan::new(store.clone(), namespace());

        let before = plan.check().await.unwrap();
        assert!(before.values().all(|exists| !exists));

        SecretPlan::new(store.clone(), namespace())
            .with_kinds(&[SecretKind::Ironic])
            .ensure_all()
            .await
            .unwrap();

        let after = plan.check().await.unwrap();
        assert!(after[&SecretKind::Ironic]);
        assert!(!after[&SecretKind::Mariadb]);
        assert_eq!(store.create_count(), 1);
    }

    #[tokio::test]
    async fn test_stops_at_first_fatal_error() {
        let store = Arc::new(DenyOne {
            inner: MemoryStore::new(),
            denied: "metal3-ironic-password",
        });
        let plan = SecretPlan::new(store.clone(), namespace());

        let err = plan.ensure_all().await.unwrap_err();
        assert!(matches!(err, ProvisionError::StoreRead { ref name, .. } if name == "metal3-ironic-password"));

        // mariadb ran before the failure, inspector never ran
        assert_eq!(store.inner.len().await, 1);
        assert!(store
            .inner
            .get("metal3", "metal3-ironic-inspector-password")
            .await
            .unwrap_err()
            .is_not_found());
    }
}
