//! Network resolution
//!
//! Turns a declared network plus an environment snapshot into the parameter
//! set a wallet provider needs. Only the selected network is inspected.

use crate::config::{NetworkConfig, ProjectConfig};
use crate::env::EnvSnapshot;
use crate::error::ConfigError;
use crate::network::credential::Credential;
use crate::units::GasPrice;
use crate::util::SecretString;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};
use url::Url;

/// Schemes a JSON-RPC endpoint may use
const ENDPOINT_SCHEMES: &[&str] = &["http", "https", "ws", "wss"];

/// A validated RPC endpoint
///
/// Provider URLs usually embed an API key in the path or query, so only the
/// scheme and host are ever displayed.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: SecretString,
    scheme: String,
    host: String,
}

impl Endpoint {
    /// Parse and validate an endpoint; the error never quotes the input.
    pub fn parse(raw: &SecretString) -> Result<Self, String> {
        let url = Url::parse(raw.expose_secret().trim())
            .map_err(|e| format!("not a valid URL ({})", e))?;

        if !ENDPOINT_SCHEMES.contains(&url.scheme()) {
            return Err(format!(
                "unsupported scheme '{}', expected http, https, ws or wss",
                url.scheme()
            ));
        }

        let host = url
            .host_str()
            .ok_or_else(|| "URL has no host".to_string())?
            .to_string();

        Ok(Self {
            url: SecretString::new(url.as_str()),
            scheme: url.scheme().to_string(),
            host,
        })
    }

    /// The full URL, for handing to a transport.
    pub fn url(&self) -> &SecretString {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/[REDACTED]", self.scheme, self.host)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Endpoint").field(&self.to_string()).finish()
    }
}

impl Serialize for Endpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Everything a wallet provider needs to sign for one network
#[derive(Debug, Clone, Serialize)]
pub struct ProviderBinding {
    pub network: String,
    pub chain_id: u64,
    pub endpoint: Endpoint,
    pub credential: Credential,
    pub timeout_blocks: u64,
    pub skip_dry_run: bool,
    pub gas_limit: u64,
    pub gas_price: GasPrice,
}

/// Resolve the named network against the environment snapshot.
///
/// Fails with [`ConfigError::MissingConfiguration`] listing every required
/// variable that is absent or blank. Other declared networks are not looked at.
pub fn resolve_network(
    config: &ProjectConfig,
    name: &str,
    env: &EnvSnapshot,
) -> Result<ProviderBinding, ConfigError> {
    let network = config
        .networks
        .get(name)
        .ok_or_else(|| ConfigError::UnknownNetwork {
            name: name.to_string(),
            declared: config.network_names(),
        })?;

    let binding = resolve_declared(name, network, env)?;

    info!(
        network = %binding.network,
        chain_id = binding.chain_id,
        endpoint = %binding.endpoint,
        credential = %binding.credential.kind(),
        "Resolved network"
    );

    Ok(binding)
}

fn resolve_declared(
    name: &str,
    network: &NetworkConfig,
    env: &EnvSnapshot,
) -> Result<ProviderBinding, ConfigError> {
    // Same order the wallet provider takes its arguments: secret, then endpoint.
    let secret = env.secret(&network.secret_env);
    let endpoint = env.secret(&network.rpc_endpoint_env);

    let (secret, endpoint) = match (secret, endpoint) {
        (Some(s), Some(e)) => (s, e),
        (s, e) => {
            let mut variables = Vec::new();
            if s.is_none() {
                variables.push(network.secret_env.clone());
            }
            if e.is_none() {
                variables.push(network.rpc_endpoint_env.clone());
            }
            debug!(network = name, ?variables, "Required variables not set");
            return Err(ConfigError::MissingConfiguration {
                network: name.to_string(),
                variables,
            });
        }
    };

    let credential = Credential::classify(secret).map_err(|reason| ConfigError::InvalidSecret {
        network: name.to_string(),
        variable: network.secret_env.clone(),
        reason,
    })?;

    let endpoint = Endpoint::parse(&endpoint).map_err(|reason| ConfigError::InvalidEndpoint {
        network: name.to_string(),
        variable: network.rpc_endpoint_env.clone(),
        reason,
    })?;

    Ok(ProviderBinding {
        network: name.to_string(),
        chain_id: network.chain_id,
        endpoint,
        credential,
        timeout_blocks: network.timeout_blocks,
        skip_dry_run: network.skip_dry_run,
        gas_limit: network.gas_limit,
        gas_price: network.gas_price,
    })
}

/// Resolve the API key for a service listed under `api_keys`.
pub fn resolve_api_key(
    config: &ProjectConfig,
    service: &str,
    env: &EnvSnapshot,
) -> Result<SecretString, ConfigError> {
    let var = config
        .api_keys
        .get(service)
        .ok_or_else(|| ConfigError::Invalid {
            message: format!("no api_keys entry for service '{}'", service),
        })?;

    env.secret(var)
        .ok_or_else(|| ConfigError::missing(format!("api_keys.{}", service), var.clone()))
}
