//! Error types for deployconf
//!
//! This module defines the error hierarchy used throughout the crate.
//! We use `thiserror` for library-style errors that are part of the API;
//! the binary converts them to `anyhow` at its boundary.
//!
//! Messages name environment variables and networks, never the values
//! read from them.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error(
        "Missing required environment variable(s) for network '{network}': {}",
        .variables.join(", ")
    )]
    MissingConfiguration {
        network: String,
        variables: Vec<String>,
    },

    #[error("Unknown network '{name}' (declared: {})", .declared.join(", "))]
    UnknownNetwork { name: String, declared: Vec<String> },

    #[error("Chain id {chain_id} is declared by both '{first}' and '{second}'")]
    DuplicateChainId {
        chain_id: u64,
        first: String,
        second: String,
    },

    #[error("Invalid gas price '{input}': {reason}")]
    InvalidGasPrice { input: String, reason: String },

    #[error("Invalid secret in {variable} for network '{network}': {reason}")]
    InvalidSecret {
        network: String,
        variable: String,
        reason: String,
    },

    #[error("Invalid RPC endpoint in {variable} for network '{network}': {reason}")]
    InvalidEndpoint {
        network: String,
        variable: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Shorthand for a single missing variable.
    pub fn missing(network: impl Into<String>, variable: impl Into<String>) -> Self {
        ConfigError::MissingConfiguration {
            network: network.into(),
            variables: vec![variable.into()],
        }
    }

    /// True for the fatal "required variable absent" condition.
    pub fn is_missing_configuration(&self) -> bool {
        matches!(self, ConfigError::MissingConfiguration { .. })
    }
}

/// Plugin execution errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Unknown plugin '{0}'")]
    UnknownPlugin(String),

    #[error("Contract '{0}' not found in build artifacts")]
    UnknownContract(String),

    #[error("Invalid artifact {}: {reason}", .path.display())]
    Artifact { path: PathBuf, reason: String },

    #[error("Build directory {} not found (compile first?)", .0.display())]
    MissingBuildDirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configuration_lists_variables() {
        let err = ConfigError::MissingConfiguration {
            network: "matic".into(),
            variables: vec!["MATIC_DEPLOYER_FINAL".into(), "MATIC_ENDPOINT_FINAL".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'matic'"));
        assert!(msg.contains("MATIC_DEPLOYER_FINAL, MATIC_ENDPOINT_FINAL"));
        assert!(err.is_missing_configuration());
    }

    #[test]
    fn test_missing_shorthand() {
        let err = ConfigError::missing("mumbai", "MUMBAI_ENDPOINT");
        assert!(matches!(
            err,
            ConfigError::MissingConfiguration { ref variables, .. } if variables == &["MUMBAI_ENDPOINT"]
        ));
    }

    #[test]
    fn test_unknown_network_message() {
        let err = ConfigError::UnknownNetwork {
            name: "goerli".into(),
            declared: vec!["matic".into(), "mumbai".into()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown network 'goerli' (declared: matic, mumbai)"
        );
        assert!(!err.is_missing_configuration());
    }

    #[test]
    fn test_app_error_wraps() {
        let err: AppError = PluginError::UnknownPlugin("truffle-foo".into()).into();
        assert!(err.to_string().contains("truffle-foo"));
    }
}
