//! Contract size report
//!
//! Reads compiled artifacts from the build directory and reports the size of
//! each contract's deployed bytecode, flagging anything over the EIP-170
//! limit.

use crate::error::{PluginError, PluginResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// EIP-170 deployed bytecode limit in KiB
pub const EIP170_LIMIT_KIB: f64 = 24.0;

/// Options for a size report run
#[derive(Debug, Clone, Default)]
pub struct SizeOptions {
    /// Only report these contracts (all if empty)
    pub contracts: Vec<String>,
    /// Skip contracts whose name ends in `Mock`
    pub ignore_mocks: bool,
    /// Show sizes in bytes instead of KiB
    pub size_in_bytes: bool,
    /// Flag contracts above this many KiB
    pub max_size_kib: Option<f64>,
}

/// One reported contract
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractSize {
    pub name: String,
    pub bytes: usize,
}

impl ContractSize {
    pub fn kib(&self) -> f64 {
        self.bytes as f64 / 1024.0
    }
}

/// Result of a size report run
#[derive(Debug, Clone, Serialize)]
pub struct SizeReport {
    pub contracts: Vec<ContractSize>,
    pub max_size_kib: Option<f64>,
    #[serde(skip)]
    size_in_bytes: bool,
}

impl SizeReport {
    /// Contracts above the configured limit, if a limit was set.
    pub fn oversized(&self) -> Vec<&ContractSize> {
        match self.max_size_kib {
            Some(limit) => self.contracts.iter().filter(|c| c.kib() > limit).collect(),
            None => Vec::new(),
        }
    }

    pub fn has_oversized(&self) -> bool {
        !self.oversized().is_empty()
    }

    fn format_size(&self, contract: &ContractSize) -> String {
        if self.size_in_bytes {
            format!("{} bytes", contract.bytes)
        } else {
            format!("{:.2} KiB", contract.kib())
        }
    }
}

impl fmt::Display for SizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .contracts
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max("Contract".len());

        writeln!(f, "{:<name_width$}  Size", "Contract")?;
        writeln!(f, "{}", "-".repeat(name_width + 16))?;
        for contract in &self.contracts {
            let marker = match self.max_size_kib {
                Some(limit) if contract.kib() > limit => "  (exceeds limit)",
                _ => "",
            };
            writeln!(
                f,
                "{:<name_width$}  {}{}",
                contract.name,
                self.format_size(contract),
                marker
            )?;
        }

        if let Some(limit) = self.max_size_kib {
            let over = self.oversized();
            if over.is_empty() {
                writeln!(f, "\nAll contracts are within {} KiB", limit)?;
            } else {
                writeln!(f, "\n{} contract(s) exceed {} KiB", over.len(), limit)?;
            }
        }
        Ok(())
    }
}

/// Fields we need from a compiled artifact
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Artifact {
    contract_name: String,
    #[serde(default)]
    deployed_bytecode: String,
}

/// Bytes encoded by a hex bytecode string, with or without `0x`.
///
/// Unlinked library placeholders (`__$...$__`) count as their encoded length.
fn bytecode_len(bytecode: &str) -> Result<usize, String> {
    let hex = bytecode.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex).as_bytes();

    let mut i = 0;
    while i < hex.len() {
        if hex[i].is_ascii_hexdigit() {
            i += 1;
        } else if is_link_placeholder(&hex[i..]) {
            i += LINK_PLACEHOLDER_LEN;
        } else {
            return Err(format!(
                "deployedBytecode has a non-hex character at offset {}",
                i
            ));
        }
    }

    if hex.len() % 2 != 0 {
        return Err("deployedBytecode has an odd number of hex digits".to_string());
    }
    Ok(hex.len() / 2)
}

/// An address-sized slot, in hex digits, reserved for a linked library
const LINK_PLACEHOLDER_LEN: usize = 40;

fn is_link_placeholder(rest: &[u8]) -> bool {
    rest.len() >= LINK_PLACEHOLDER_LEN
        && rest.starts_with(b"__")
        && rest[LINK_PLACEHOLDER_LEN - 2..LINK_PLACEHOLDER_LEN] == *b"__"
}

/// Build a size report from the artifacts in `build_dir`.
pub fn report(build_dir: &Path, options: &SizeOptions) -> PluginResult<SizeReport> {
    if !build_dir.is_dir() {
        return Err(PluginError::MissingBuildDirectory(build_dir.to_path_buf()));
    }

    let mut contracts = Vec::new();
    for entry in fs::read_dir(build_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let raw = fs::read_to_string(&path)?;
        let artifact: Artifact = match serde_json::from_str(&raw) {
            Ok(a) => a,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping non-artifact JSON file");
                continue;
            }
        };

        let bytes = bytecode_len(&artifact.deployed_bytecode).map_err(|reason| {
            PluginError::Artifact {
                path: path.clone(),
                reason,
            }
        })?;

        debug!(contract = %artifact.contract_name, bytes, "Read artifact");
        contracts.push(ContractSize {
            name: artifact.contract_name,
            bytes,
        });
    }

    for wanted in &options.contracts {
        if !contracts.iter().any(|c| &c.name == wanted) {
            return Err(PluginError::UnknownContract(wanted.clone()));
        }
    }

    contracts.retain(|c| {
        (options.contracts.is_empty() || options.contracts.contains(&c.name))
            && !(options.ignore_mocks && c.name.ends_with("Mock"))
    });
    contracts.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(SizeReport {
        contracts,
        max_size_kib: options.max_size_kib,
        size_in_bytes: options.size_in_bytes,
    })
}
