//! Utility functions shared across the crate.

mod secret;

pub use secret::SecretString;

use std::path::PathBuf;

/// Expand a leading `~` and `$VAR` references in a user-supplied path.
///
/// Falls back to the path as written if an unknown variable is referenced.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}

/// Check whether a string is usable as an environment variable name.
///
/// Accepts `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_env_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
