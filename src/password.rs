//! Password generation and the explicit/generated/none decision.
//!
//! Generated passwords are a convenience: they come from the thread-local RNG and are good enough
//! to keep a casual recipient out, not to guard real secrets. Pass an explicit password when that
//! matters.

use rand::Rng;

use crate::ArchiverError;

/// Lowercase, uppercase, digits and eight symbols: 70 characters.
pub const PASSWORD_ALPHABET: &[u8; 70] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";

/// Returns `length` characters drawn uniformly, with replacement, from [`PASSWORD_ALPHABET`].
pub fn generate_password(length: usize) -> Result<String, ArchiverError> {
    if length == 0 {
        return Err(ArchiverError::Usage("Password length must be at least 1.".into()));
    }
    let mut rng = rand::thread_rng();
    Ok((0..length)
        .map(|_| PASSWORD_ALPHABET[rng.gen_range(0..PASSWORD_ALPHABET.len())] as char)
        .collect())
}

/// Which password, if any, protects the archive. Resolved once before anything touches the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordDecision {
    /// Supplied by the caller.
    Explicit(String),
    /// Generated for this run; must be shown to the user, it exists nowhere else.
    Generated(String),
    None,
}

impl PasswordDecision {
    /// An explicit password always wins; otherwise a requested length generates one.
    pub fn resolve(explicit: Option<String>, generate_length: Option<usize>) -> Result<Self, ArchiverError> {
        if let Some(pass) = explicit {
            return Ok(PasswordDecision::Explicit(pass));
        }
        match generate_length {
            Some(len) => Ok(PasswordDecision::Generated(generate_password(len)?)),
            None => Ok(PasswordDecision::None),
        }
    }

    pub fn password(&self) -> Option<&str> {
        match self {
            PasswordDecision::Explicit(p) | PasswordDecision::Generated(p) => Some(p.as_str()),
            PasswordDecision::None => None,
        }
    }

    /// The password to print, only when this run invented it.
    pub fn generated(&self) -> Option<&str> {
        match self {
            PasswordDecision::Generated(p) => Some(p.as_str()),
            _ => None,
        }
    }
}
