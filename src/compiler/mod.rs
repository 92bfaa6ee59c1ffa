//! Compiler invocation parameters
//!
//! Renders the configured solc version and optimizer settings into the
//! standard-JSON shape solc consumes. The values are passed through as
//! configured; compiling is left to solc.

use crate::config::{CompilerConfig, ProjectConfig};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Artifacts requested from solc for every contract
const OUTPUT_SELECTION: &[&str] = &[
    "abi",
    "evm.bytecode",
    "evm.deployedBytecode",
    "evm.methodIdentifiers",
    "metadata",
];

/// What to hand the compiler toolchain
#[derive(Debug, Clone, Serialize)]
pub struct CompilerInvocation {
    /// Exact solc release, e.g. `0.8.14`
    pub version: String,
    pub output_directory: PathBuf,
    /// solc standard-JSON `settings` object
    pub settings: Value,
}

impl CompilerInvocation {
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            version: config.compiler.version.to_string(),
            output_directory: config.build_output_directory.clone(),
            settings: solc_settings(&config.compiler),
        }
    }

    /// Full standard-JSON input for the given sources (path to file content).
    pub fn standard_json_input(&self, sources: &BTreeMap<String, String>) -> Value {
        let sources: serde_json::Map<String, Value> = sources
            .iter()
            .map(|(path, content)| (path.clone(), json!({ "content": content })))
            .collect();

        json!({
            "language": "Solidity",
            "sources": sources,
            "settings": self.settings,
        })
    }
}

/// Build solc's `settings` object from the compiler configuration.
pub fn solc_settings(compiler: &CompilerConfig) -> Value {
    let mut settings = json!({
        "optimizer": {
            "enabled": compiler.optimizer.enabled,
            "runs": compiler.optimizer.runs,
        },
        "outputSelection": {
            "*": {
                "*": OUTPUT_SELECTION,
            }
        }
    });

    if let Some(evm) = &compiler.evm_version {
        settings["evmVersion"] = Value::String(evm.clone());
    }

    settings
}
