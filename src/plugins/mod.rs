//! Build plugins
//!
//! Plugins are declared by name in `plugins` and run after compilation.
//! Only the contract-size reporter ships with deployconf; other names are
//! rejected when they are run, not when the configuration is loaded.

pub mod contract_size;

pub use contract_size::{ContractSize, EIP170_LIMIT_KIB, SizeOptions, SizeReport};

use crate::config::{CONTRACT_SIZE_PLUGIN, ProjectConfig};
use crate::error::{PluginError, PluginResult};
use crate::util::expand_path;
use tracing::info;

/// A plugin deployconf knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plugin {
    ContractSize,
}

impl Plugin {
    pub fn from_name(name: &str) -> PluginResult<Self> {
        match name {
            CONTRACT_SIZE_PLUGIN => Ok(Plugin::ContractSize),
            other => Err(PluginError::UnknownPlugin(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Plugin::ContractSize => CONTRACT_SIZE_PLUGIN,
        }
    }
}

/// Resolve every configured plugin, in declaration order.
pub fn configured_plugins(config: &ProjectConfig) -> PluginResult<Vec<Plugin>> {
    config
        .plugins
        .iter()
        .map(|name| Plugin::from_name(name))
        .collect()
}

/// Run the contract-size report over the configured build directory.
///
/// Fails with [`PluginError::UnknownPlugin`] if the plugin is not enabled.
pub fn run_contract_size(config: &ProjectConfig, options: &SizeOptions) -> PluginResult<SizeReport> {
    if !config.plugins.iter().any(|p| p == CONTRACT_SIZE_PLUGIN) {
        return Err(PluginError::UnknownPlugin(format!(
            "{} (not listed in plugins)",
            CONTRACT_SIZE_PLUGIN
        )));
    }

    let build_dir = expand_path(&config.build_output_directory.to_string_lossy());
    let report = contract_size::report(&build_dir, options)?;

    info!(
        plugin = Plugin::ContractSize.name(),
        contracts = report.contracts.len(),
        oversized = report.oversized().len(),
        "Contract size report complete"
    );

    Ok(report)
}
