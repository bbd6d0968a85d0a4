//! htpasswd-compatible hash derivation and the basic-auth config block.
//!
//! The downstream verifier expects bcrypt hashes in the `$2y$` form written by
//! the Apache `htpasswd` tool at its default cost of 5. Rust's bcrypt emits
//! `$2b$`; the variants differ only for passwords with high-bit characters,
//! which generated passwords never contain, so the marker is rewritten.

use crate::password::Password;
use provisioning_types::{ProvisionError, Result};
use std::fmt;
use std::str::FromStr;

/// bcrypt cost used by `htpasswd -B`.
pub const HTPASSWD_COST: u32 = 5;

/// Version marker the downstream verifier expects.
pub const HTPASSWD_VERSION: char = 'y';

/// Hash a password for an htpasswd entry.
///
/// The result always starts with `$2y$05$`.
pub fn derive_hash(password: &Password) -> Result<String> {
    let hash = bcrypt::hash(password.expose(), HTPASSWD_COST)
        .map_err(|e| ProvisionError::HashDerivation(format!("Failed to bcrypt hash: {}", e)))?;
    force_version_marker(&hash)
}

/// Rebuild a bcrypt hash with its version marker replaced by `y`.
///
/// Accepts any `$2?$` hash (`2a`, `2b`, `2x`, `2y`) and leaves the cost, salt,
/// and digest untouched.
pub fn force_version_marker(hash: &str) -> Result<String> {
    let bytes = hash.as_bytes();
    let well_formed = bytes.len() > 4
        && bytes[0] == b'$'
        && bytes[1] == b'2'
        && bytes[2].is_ascii_lowercase()
        && bytes[3] == b'$';

    if !well_formed {
        return Err(ProvisionError::HashDerivation(
            "bcrypt produced a hash without a $2?$ version prefix".to_string(),
        ));
    }

    Ok(format!("$2{}{}", HTPASSWD_VERSION, &hash[3..]))
}

/// Render the INI block consumed by the service's basic-auth config loader.
pub fn auth_config(section: &str, username: &str, password: &Password) -> String {
    format!(
        "[{}]\nauth_type = http_basic\nusername = {}\npassword = {}\n",
        section,
        username,
        password.expose()
    )
}

/// A single `username:hash` htpasswd line.
#[derive(Clone, PartialEq, Eq)]
pub struct HtpasswdEntry {
    username: String,
    hash: String,
}

impl HtpasswdEntry {
    /// Pair `username` with an already derived hash.
    pub fn new(username: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            hash: hash.into(),
        }
    }

    /// The username part.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The hash part.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Check a plaintext password against the stored hash.
    pub fn verify(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.hash).unwrap_or(false)
    }
}

impl fmt::Display for HtpasswdEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.username, self.hash)
    }
}

impl fmt::Debug for HtpasswdEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtpasswdEntry")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl FromStr for HtpasswdEntry {
    type Err = ProvisionError;

    fn from_str(line: &str) -> Result<Self> {
        let (username, hash) = line.split_once(':').ok_or_else(|| {
            ProvisionError::Validation("htpasswd line must be <username>:<hash>".to_string())
        })?;

        if username.is_empty() || hash.is_empty() {
            return Err(ProvisionError::Validation(
                "htpasswd line has an empty username or hash".to_string(),
            ));
        }

        Ok(Self::new(username, hash))
    }
}
