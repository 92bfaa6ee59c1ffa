//! Smart-contract deployment configuration
//!
//! Holds the deployment networks, compiler settings, test-runner options and
//! plugin list of a Solidity project, and resolves them into what the external
//! toolchain needs: a wallet-provider binding per network, solc standard-JSON
//! settings, and a contract-size report over the build artifacts.
//!
//! ## Secrets
//!
//! Configuration files only *name* the environment variables that hold
//! mnemonics, private keys and RPC URLs. Values are read from an explicit
//! [`EnvSnapshot`] when a network is selected, wrapped in
//! [`util::SecretString`], and shown as `[REDACTED]` in every log line,
//! error message and serialized form.
//!
//! ## Example Configuration
//!
//! ```toml
//! build_output_directory = "./build"
//! plugins = ["truffle-contract-size"]
//!
//! [networks.mumbai]
//! chain_id = 80001
//! rpc_endpoint_env = "MUMBAI_ENDPOINT"
//! secret_env = "MUMBAI_DEPLOYER"
//! skip_dry_run = true
//! gas_price = "100 gwei"
//!
//! [compiler]
//! version = "0.8.14"
//!
//! [compiler.optimizer]
//! enabled = true
//! runs = 20000
//!
//! [test_runner]
//! enable_timeouts = false
//! ```

pub mod compiler;
pub mod config;
pub mod env;
pub mod error;
pub mod network;
pub mod plugins;
pub mod units;
pub mod util;

// Re-export main types
pub use compiler::CompilerInvocation;
pub use config::{ProjectConfig, load_config, load_config_from_str};
pub use env::EnvSnapshot;
pub use error::{AppError, ConfigError, PluginError, Result};
pub use network::{ProviderBinding, resolve_network};
pub use units::GasPrice;
