//! Error types for provisioning operations.

use thiserror::Error;

/// Errors reported by a secrets store backend.
///
/// The provisioner branches on these variants: `NotFound` on read and
/// `Conflict` on create are part of the normal create-if-absent protocol,
/// everything else is fatal to the current invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested secret does not exist
    #[error("secret {namespace}/{name} not found")]
    NotFound {
        /// Namespace that was searched
        namespace: String,
        /// Name of the missing secret
        name: String,
    },

    /// A secret with the same name already exists
    #[error("secret {namespace}/{name} already exists")]
    Conflict {
        /// Namespace of the conflicting secret
        namespace: String,
        /// Name of the conflicting secret
        name: String,
    },

    /// The caller lacks credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller's credentials do not permit the operation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The request never produced a response
    #[error("transport failure: {0}")]
    Transport(String),

    /// Any other non-success response
    #[error("store returned {status}: {message}")]
    Api {
        /// HTTP-style status code
        status: u16,
        /// Message returned by the store
        message: String,
    },
}

impl StoreError {
    /// Whether this error means the secret is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Whether this error means a secret with that name already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// The main error type for provisioning operations.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The secure random source failed
    #[error("Random source error: {0}")]
    RandomSource(String),

    /// Reading a secret failed for a reason other than absence
    #[error("Failed to read secret {namespace}/{name}: {source}")]
    StoreRead {
        /// Target namespace
        namespace: String,
        /// Secret name
        name: String,
        /// Error reported by the store, unchanged
        #[source]
        source: StoreError,
    },

    /// Creating a secret failed for a reason other than a conflict
    #[error("Failed to create secret {namespace}/{name}: {source}")]
    StoreWrite {
        /// Target namespace
        namespace: String,
        /// Secret name
        name: String,
        /// Error reported by the store, unchanged
        #[source]
        source: StoreError,
    },

    /// bcrypt hashing failed
    #[error("Hash derivation error: {0}")]
    HashDerivation(String),

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl ProvisionError {
    /// The store error behind a read or write failure, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ProvisionError::StoreRead { source, .. }
            | ProvisionError::StoreWrite { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A specialized Result type for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
