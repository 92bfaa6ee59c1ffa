//! Environment snapshot
//!
//! The loader never reads `std::env` on its own. Callers capture the
//! environment once at startup into an [`EnvSnapshot`] and pass it down,
//! optionally layered over a `.env` file. Process variables win over the
//! file, matching dotenv semantics, and the process environment itself is
//! never modified.

use crate::error::ConfigError;
use crate::util::SecretString;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Immutable view of environment variables for one invocation
#[derive(Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Capture the process environment layered over a `.env` file.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn from_process_with_dotenv(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut snapshot = Self::new();
        snapshot.merge_dotenv(path)?;
        for (k, v) in Self::from_process().vars {
            snapshot.vars.insert(k, v);
        }
        Ok(snapshot)
    }

    /// Build a snapshot from explicit pairs (tests, embedding).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add entries from a `.env` file without overriding existing ones.
    pub fn merge_dotenv(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No .env file, skipping");
            return Ok(());
        }

        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            ConfigError::Load(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut added = 0usize;
        for item in iter {
            let (key, value) = item.map_err(|e| {
                ConfigError::Load(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            if !self.vars.contains_key(&key) {
                self.vars.insert(key, value);
                added += 1;
            }
        }

        debug!(path = %path.display(), added, "Loaded .env file");
        Ok(())
    }

    /// Raw lookup, returning `None` for absent variables.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Lookup a variable holding secret material.
    ///
    /// Absent and blank values both yield `None`.
    pub fn secret(&self, name: &str) -> Option<SecretString> {
        self.get(name)
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::new)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// All variables starting with `prefix`, for the layered config source.
    pub fn with_prefix(&self, prefix: &str) -> HashMap<String, String> {
        self.vars
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

// Values are secret-bearing; only names are shown.
impl std::fmt::Debug for EnvSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.vars.keys().collect();
        names.sort();
        f.debug_struct("EnvSnapshot").field("vars", &names).finish()
    }
}
