//! Random password generation.

use provisioning_types::{ProvisionError, Result};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of characters in a generated password.
pub const PASSWORD_LENGTH: usize = 16;

/// Symbols a generated password is drawn from.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
abcdefghijklmnopqrstuvwxyz\
0123456789";

// Largest multiple of the alphabet size that fits in a byte. Bytes at or
// above it are discarded so `byte % 62` stays uniform.
const ACCEPT_BELOW: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

/// A generated password.
///
/// `Debug` and `Display` are redacted and the contents are zeroized on drop.
/// Use [`Password::expose`] at the point the plaintext is written out.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    /// The plaintext value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the password is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Generate a password from the operating system's secure random source.
///
/// # Errors
///
/// Returns [`ProvisionError::RandomSource`] if the OS source fails.
pub fn generate_password() -> Result<Password> {
    generate_password_with(&mut OsRng)
}

/// Generate a password from the given cryptographically secure source.
///
/// Every character is drawn independently with probability exactly 1/62.
pub fn generate_password_with<R>(rng: &mut R) -> Result<Password>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let mut password = Password(String::with_capacity(PASSWORD_LENGTH));
    let mut buf = [0u8; PASSWORD_LENGTH * 2];

    while password.0.len() < PASSWORD_LENGTH {
        if let Err(e) = rng.try_fill_bytes(&mut buf) {
            buf.zeroize();
            return Err(ProvisionError::RandomSource(e.to_string()));
        }

        for &byte in buf.iter().filter(|&&b| b < ACCEPT_BELOW) {
            password.0.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
            if password.0.len() == PASSWORD_LENGTH {
                break;
            }
        }
    }

    buf.zeroize();
    Ok(password)
}
