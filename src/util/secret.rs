//! Secret string type for safe credential handling.
//!
//! Provides a wrapper type that prevents accidental logging of mnemonics,
//! private keys and endpoint URLs carrying API keys.

use serde::{Deserialize, Serialize};
use std::fmt;

const REDACTED: &str = "[REDACTED]";

/// A wrapper for secrets that prevents accidental logging.
///
/// # Features
/// - `Debug`, `Display` and `Serialize` show `[REDACTED]` instead of the value
/// - Explicit `expose_secret()` method required to access the actual value
/// - Clears memory on drop (best-effort, not cryptographically secure)
///
/// # Example
/// ```
/// use deployconf::util::SecretString;
///
/// let phrase = SecretString::new("test test test");
/// assert_eq!(format!("{:?}", phrase), "[REDACTED]");
/// assert_eq!(phrase.expose_secret(), "test test test");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret from any string-like value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Explicitly expose the secret value.
    ///
    /// Only the consumer that hands the value to the wallet provider
    /// should call this.
    #[inline]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// True if the secret is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // Best-effort only: earlier moves or reallocations may have left copies.
        self.0.clear();
        self.0.shrink_to_fit();
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::new)
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}
