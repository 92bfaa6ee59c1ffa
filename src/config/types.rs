//! Configuration types for deployconf
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables. Networks reference their
//! credentials by environment variable name only; the values are read at
//! resolution time (see [`crate::network`]).

use crate::units::GasPrice;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Where compiled contract artifacts are written
    pub build_output_directory: PathBuf,

    /// Deployment networks keyed by name
    pub networks: BTreeMap<String, NetworkConfig>,

    /// Solidity compiler settings
    pub compiler: CompilerConfig,

    /// Test runner options
    pub test_runner: TestRunnerConfig,

    /// Plugins, in invocation order
    pub plugins: Vec<String>,

    /// Service name to the env var holding its API key
    pub api_keys: BTreeMap<String, String>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            build_output_directory: PathBuf::from("./build"),
            networks: default_networks(),
            compiler: CompilerConfig::default(),
            test_runner: TestRunnerConfig::default(),
            plugins: vec![CONTRACT_SIZE_PLUGIN.to_string()],
            api_keys: BTreeMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Names of declared networks, sorted
    pub fn network_names(&self) -> Vec<String> {
        self.networks.keys().cloned().collect()
    }
}

/// Name of the bundled contract-size plugin
pub const CONTRACT_SIZE_PLUGIN: &str = "truffle-contract-size";

/// Gas limit shared by the built-in networks
pub const DEFAULT_GAS_LIMIT: u64 = 7_000_000;

/// Confirmation timeout shared by the built-in networks
pub const DEFAULT_TIMEOUT_BLOCKS: u64 = 200;

fn default_networks() -> BTreeMap<String, NetworkConfig> {
    BTreeMap::from([
        (
            "matic".to_string(),
            NetworkConfig {
                chain_id: 137,
                rpc_endpoint_env: "MATIC_ENDPOINT_FINAL".to_string(),
                secret_env: "MATIC_DEPLOYER_FINAL".to_string(),
                timeout_blocks: DEFAULT_TIMEOUT_BLOCKS,
                skip_dry_run: false,
                gas_limit: DEFAULT_GAS_LIMIT,
                gas_price: GasPrice::from_gwei(200),
            },
        ),
        (
            "mumbai".to_string(),
            NetworkConfig {
                chain_id: 80001,
                rpc_endpoint_env: "MUMBAI_ENDPOINT".to_string(),
                secret_env: "MUMBAI_DEPLOYER".to_string(),
                timeout_blocks: DEFAULT_TIMEOUT_BLOCKS,
                skip_dry_run: true,
                gas_limit: DEFAULT_GAS_LIMIT,
                gas_price: GasPrice::from_gwei(100),
            },
        ),
    ])
}

/// A deployment network
///
/// Unknown keys are rejected so a literal `mnemonic = "..."` or
/// `private_key = "..."` can never sneak into a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// EIP-155 chain id the signer is bound to
    pub chain_id: u64,

    /// Env var holding the RPC endpoint URL
    pub rpc_endpoint_env: String,

    /// Env var holding the deployer mnemonic or private key
    pub secret_env: String,

    /// Blocks to wait before a deployment is considered timed out
    #[serde(default = "default_timeout_blocks")]
    pub timeout_blocks: u64,

    /// Skip the simulated pre-flight run
    #[serde(default)]
    pub skip_dry_run: bool,

    /// Gas limit per deployment transaction
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,

    /// Gas price, written in any denomination and stored in wei
    pub gas_price: GasPrice,
}

fn default_timeout_blocks() -> u64 {
    DEFAULT_TIMEOUT_BLOCKS
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

/// Solidity compiler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Exact solc version
    pub version: semver::Version,

    pub optimizer: OptimizerConfig,

    /// Target EVM version (`london`, `paris`, ...); solc's default if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            version: semver::Version::new(0, 8, 14),
            optimizer: OptimizerConfig::default(),
            evm_version: None,
        }
    }
}

/// Optimizer settings passed straight through to solc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub enabled: bool,

    /// Expected number of calls per contract over its lifetime
    pub runs: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            runs: 20_000,
        }
    }
}

/// Test runner options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestRunnerConfig {
    /// When false, tests may run indefinitely
    pub enable_timeouts: bool,

    /// Per-test timeout, used only when timeouts are enabled
    pub timeout_ms: u64,
}

impl Default for TestRunnerConfig {
    fn default() -> Self {
        Self {
            enable_timeouts: false,
            timeout_ms: 2_000,
        }
    }
}

impl TestRunnerConfig {
    pub fn effective_timeout(&self) -> Option<std::time::Duration> {
        self.enable_timeouts
            .then(|| std::time::Duration::from_millis(self.timeout_ms))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.build_output_directory, PathBuf::from("./build"));
        assert_eq!(config.network_names(), vec!["matic", "mumbai"]);
        assert_eq!(config.compiler.version.to_string(), "0.8.14");
        assert!(config.compiler.optimizer.enabled);
        assert_eq!(config.compiler.optimizer.runs, 20000);
        assert!(!config.test_runner.enable_timeouts);
        assert_eq!(config.plugins, vec!["truffle-contract-size"]);
    }

    #[test]
    fn test_default_networks_match_deployment_table() {
        let config = ProjectConfig::default();

        let matic = &config.networks["matic"];
        assert_eq!(matic.chain_id, 137);
        assert_eq!(matic.secret_env, "MATIC_DEPLOYER_FINAL");
        assert_eq!(matic.rpc_endpoint_env, "MATIC_ENDPOINT_FINAL");
        assert_eq!(matic.timeout_blocks, 200);
        assert!(!matic.skip_dry_run);
        assert_eq!(matic.gas_limit, 7_000_000);
        assert_eq!(matic.gas_price.wei(), 200_000_000_000);

        let mumbai = &config.networks["mumbai"];
        assert_eq!(mumbai.chain_id, 80001);
        assert_eq!(mumbai.secret_env, "MUMBAI_DEPLOYER");
        assert_eq!(mumbai.rpc_endpoint_env, "MUMBAI_ENDPOINT");
        assert!(mumbai.skip_dry_run);
        assert_eq!(mumbai.gas_price.wei(), 100_000_000_000);
    }

    #[test]
    fn test_effective_timeout() {
        let disabled = TestRunnerConfig::default();
        assert_eq!(disabled.effective_timeout(), None);

        let enabled = TestRunnerConfig {
            enable_timeouts: true,
            timeout_ms: 5_000,
        };
        assert_eq!(
            enabled.effective_timeout(),
            Some(std::time::Duration::from_secs(5))
        );
    }

    #[test]
    fn test_network_rejects_literal_secret_field() {
        let json = r#"{
            "chain_id": 1,
            "rpc_endpoint_env": "RPC",
            "secret_env": "KEY",
            "gas_price": "1 gwei",
            "mnemonic": "test test test"
        }"#;
        let result: Result<NetworkConfig, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_log_format() {
        let fmt: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(fmt, LogFormat::Json);
    }
}
