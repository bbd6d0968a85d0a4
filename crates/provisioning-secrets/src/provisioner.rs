//! Create-if-absent provisioning of a single managed secret.

use crate::htpasswd::{auth_config, derive_hash, HtpasswdEntry};
use crate::kinds::{
    SecretKind, SecretLayout, SecretSpec, AUTH_CONFIG_KEY, HTPASSWD_KEY, PASSWORD_KEY,
    USERNAME_KEY,
};
use crate::password::{generate_password, Password};
use provisioning_types::{Namespace, ProvisionError, Result, SecretRecord, SecretsStore};
use std::fmt;

/// Outcome of [`ensure_secret`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// The secret was absent and this call created it
    Created,
    /// The secret already existed; nothing was read or written
    AlreadyExists,
    /// The secret was absent on read but another writer created it first
    CreateConflict,
}

impl Provisioned {
    /// Whether this call created the secret.
    pub fn is_created(&self) -> bool {
        matches!(self, Provisioned::Created)
    }

    /// Lowercase label for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provisioned::Created => "created",
            Provisioned::AlreadyExists => "already exists",
            Provisioned::CreateConflict => "created concurrently",
        }
    }
}

impl fmt::Display for Provisioned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ensure the secret described by `spec` exists in `namespace`.
///
/// An existing secret is never inspected or modified. If the secret is
/// absent a fresh password is generated and the full record is created in a
/// single call. Read failures other than not-found abort before anything is
/// generated.
pub async fn ensure_secret<S>(
    store: &S,
    namespace: &Namespace,
    spec: &SecretSpec,
) -> Result<Provisioned>
where
    S: SecretsStore + ?Sized,
{
    ensure_secret_with(store, namespace, spec, generate_password, derive_hash).await
}

/// [`ensure_secret`] with explicit password and hash sources.
pub async fn ensure_secret_with<S, G, H>(
    store: &S,
    namespace: &Namespace,
    spec: &SecretSpec,
    generate: G,
    hash: H,
) -> Result<Provisioned>
where
    S: SecretsStore + ?Sized,
    G: FnOnce() -> Result<Password>,
    H: FnOnce(&Password) -> Result<String>,
{
    match store.get(namespace.as_str(), spec.name).await {
        Ok(_) => {
            tracing::debug!(
                namespace = %namespace,
                secret = spec.name,
                "Secret already exists"
            );
            return Ok(Provisioned::AlreadyExists);
        }
        Err(e) if e.is_not_found() => {}
        Err(e) => {
            return Err(ProvisionError::StoreRead {
                namespace: namespace.to_string(),
                name: spec.name.to_string(),
                source: e,
            });
        }
    }

    tracing::info!("Generating secret: {}/{}", namespace, spec.name);

    let password = generate()?;
    let record = build_record_with(namespace, spec, &password, hash)?;

    match store.create(&record).await {
        Ok(()) => {
            tracing::info!(
                namespace = %namespace,
                secret = spec.name,
                keys = ?record.keys(),
                "Created secret"
            );
            Ok(Provisioned::Created)
        }
        Err(e) if e.is_conflict() => {
            tracing::debug!(
                namespace = %namespace,
                secret = spec.name,
                "Secret was created concurrently, keeping the existing one"
            );
            Ok(Provisioned::CreateConflict)
        }
        Err(e) => Err(ProvisionError::StoreWrite {
            namespace: namespace.to_string(),
            name: spec.name.to_string(),
            source: e,
        }),
    }
}

/// Build the complete record for `spec` from one password.
///
/// Every field that embeds the password is derived from the same value.
pub fn build_record(
    namespace: &Namespace,
    spec: &SecretSpec,
    password: &Password,
) -> Result<SecretRecord> {
    build_record_with(namespace, spec, password, derive_hash)
}

/// [`build_record`] with an explicit hash function for the htpasswd field.
pub fn build_record_with<H>(
    namespace: &Namespace,
    spec: &SecretSpec,
    password: &Password,
    hash: H,
) -> Result<SecretRecord>
where
    H: FnOnce(&Password) -> Result<String>,
{
    let record = SecretRecord::new(namespace.as_str(), spec.name)
        .with_field(PASSWORD_KEY, password.expose());

    match spec.layout {
        SecretLayout::Password => Ok(record),
        SecretLayout::BasicAuth { username, section } => {
            let entry = HtpasswdEntry::new(username, hash(password)?);
            Ok(record
                .with_field(USERNAME_KEY, username)
                .with_field(HTPASSWD_KEY, entry.to_string())
                .with_field(AUTH_CONFIG_KEY, auth_config(section, username, password)))
        }
    }
}

/// Ensure the database password secret exists.
pub async fn ensure_mariadb_secret<S>(store: &S, namespace: &Namespace) -> Result<Provisioned>
where
    S: SecretsStore + ?Sized,
{
    ensure_secret(store, namespace, SecretKind::Mariadb.spec()).await
}

/// Ensure the Ironic API credentials secret exists.
pub async fn ensure_ironic_secret<S>(store: &S, namespace: &Namespace) -> Result<Provisioned>
where
    S: SecretsStore + ?Sized,
{
    ensure_secret(store, namespace, SecretKind::Ironic.spec()).await
}

/// Ensure the Ironic inspector credentials secret exists.
pub async fn ensure_inspector_secret<S>(store: &S, namespace: &Namespace) -> Result<Provisioned>
where
    S: SecretsStore + ?Sized,
{
    ensure_secret(store, namespace, SecretKind::Inspector.spec()).await
}
