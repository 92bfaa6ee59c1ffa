//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (DEPLOYCONF__*) from the supplied snapshot
//! 2. Configuration file (TOML)
//! 3. Built-in defaults (the `matic` and `mumbai` networks, solc 0.8.14)
//!
//! Credentials are not part of this layering: networks only name the
//! variables that hold them, and those are read when a network is resolved.

use crate::config::types::ProjectConfig;
use crate::env::EnvSnapshot;
use crate::error::ConfigError;
use crate::util::{expand_path, is_env_var_name};
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use tracing::debug;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "deployconf.toml",
    ".deployconf.toml",
    "~/.config/deployconf/config.toml",
];

/// Prefix for environment overrides, e.g. `DEPLOYCONF__COMPILER__OPTIMIZER__RUNS`
pub const ENV_PREFIX: &str = "DEPLOYCONF";

const ENV_SEPARATOR: &str = "__";

/// EVM versions accepted by solc's `evmVersion` setting
const EVM_VERSIONS: &[&str] = &[
    "homestead",
    "tangerineWhistle",
    "spuriousDragon",
    "byzantium",
    "constantinople",
    "petersburg",
    "istanbul",
    "berlin",
    "london",
    "paris",
    "shanghai",
    "cancun",
];

fn defaults_source() -> Result<Config, ConfigError> {
    Config::try_from(&ProjectConfig::default()).map_err(|e| ConfigError::Load(e.to_string()))
}

/// Load configuration from a TOML string layered over the defaults
pub fn load_config_from_str(toml_str: &str) -> Result<ProjectConfig, ConfigError> {
    let config = Config::builder()
        .add_source(defaults_source()?)
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let project: ProjectConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&project)?;

    Ok(project)
}

/// Load configuration from files and the environment snapshot
pub fn load_config(
    config_path: Option<&str>,
    env: &EnvSnapshot,
) -> Result<ProjectConfig, ConfigError> {
    let mut builder = Config::builder().add_source(defaults_source()?);

    if let Some(path) = config_path {
        // Explicit path provided - must exist
        let expanded = expand_path(path);
        if !expanded.exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        debug!(path = %expanded.display(), "Using configuration file");
        builder = builder.add_source(File::new(&expanded.to_string_lossy(), FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = expand_path(path);
            if expanded.exists() {
                debug!(path = %expanded.display(), "Using configuration file");
                builder = builder.add_source(File::new(&expanded.to_string_lossy(), FileFormat::Toml));
                break;
            }
        }
    }

    // Double underscore (__) maps to nested keys (compiler.optimizer.runs)
    let overrides: HashMap<String, String> =
        env.with_prefix(&format!("{ENV_PREFIX}{ENV_SEPARATOR}"));
    if !overrides.is_empty() {
        debug!(count = overrides.len(), "Applying environment overrides");
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(Some(overrides)),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let project: ProjectConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&project)?;

    Ok(project)
}

/// Validate configuration values
pub fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.build_output_directory.as_os_str().is_empty() {
        return Err(ConfigError::Invalid {
            message: "build_output_directory must not be empty".to_string(),
        });
    }

    validate_networks(config)?;
    validate_compiler(config)?;
    validate_plugins(&config.plugins)?;

    for (service, var) in &config.api_keys {
        validate_env_name(var, &format!("api_keys.{}", service))?;
    }

    Ok(())
}

fn validate_networks(config: &ProjectConfig) -> Result<(), ConfigError> {
    // Network names are map keys and therefore unique already.
    let mut chain_owners: HashMap<u64, &str> = HashMap::new();

    for (name, network) in &config.networks {
        if network.chain_id == 0 {
            return Err(ConfigError::Invalid {
                message: format!("networks.{}.chain_id must be greater than 0", name),
            });
        }

        validate_env_name(&network.secret_env, &format!("networks.{}.secret_env", name))?;
        validate_env_name(
            &network.rpc_endpoint_env,
            &format!("networks.{}.rpc_endpoint_env", name),
        )?;

        if network.secret_env == network.rpc_endpoint_env {
            return Err(ConfigError::Invalid {
                message: format!(
                    "networks.{}: secret_env and rpc_endpoint_env must be different variables",
                    name
                ),
            });
        }

        if network.gas_limit == 0 {
            return Err(ConfigError::Invalid {
                message: format!("networks.{}.gas_limit must be greater than 0", name),
            });
        }

        if let Some(first) = chain_owners.insert(network.chain_id, name) {
            return Err(ConfigError::DuplicateChainId {
                chain_id: network.chain_id,
                first: first.to_string(),
                second: name.clone(),
            });
        }
    }

    Ok(())
}

fn validate_compiler(config: &ProjectConfig) -> Result<(), ConfigError> {
    let compiler = &config.compiler;

    if compiler.optimizer.enabled && compiler.optimizer.runs == 0 {
        return Err(ConfigError::Invalid {
            message: "compiler.optimizer.runs must be greater than 0 when the optimizer is enabled"
                .to_string(),
        });
    }

    if let Some(evm) = &compiler.evm_version
        && !EVM_VERSIONS.contains(&evm.as_str())
    {
        return Err(ConfigError::Invalid {
            message: format!(
                "compiler.evm_version '{}' is not one of: {}",
                evm,
                EVM_VERSIONS.join(", ")
            ),
        });
    }

    Ok(())
}

fn validate_plugins(plugins: &[String]) -> Result<(), ConfigError> {
    for (i, plugin) in plugins.iter().enumerate() {
        if plugin.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: format!("plugins[{}] must not be empty", i),
            });
        }
        if plugins[..i].contains(plugin) {
            return Err(ConfigError::Invalid {
                message: format!("plugin '{}' is listed more than once", plugin),
            });
        }
    }
    Ok(())
}

/// Reject anything that is not an env var name.
///
/// The offending value is deliberately left out of the message: a field
/// that fails here most likely holds the secret itself.
fn validate_env_name(value: &str, field_path: &str) -> Result<(), ConfigError> {
    if is_env_var_name(value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            message: format!(
                "{} must name an environment variable ([A-Za-z_][A-Za-z0-9_]*), not hold a value",
                field_path
            ),
        })
    }
}
