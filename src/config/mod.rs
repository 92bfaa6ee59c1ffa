//! Configuration module
//!
//! Handles loading and validating configuration from TOML files and an
//! environment snapshot.

pub mod loader;
pub mod types;

pub use loader::{ENV_PREFIX, load_config, load_config_from_str, validate_config};
pub use types::*;
