//! Network module
//!
//! Resolves a declared deployment network into a wallet-provider binding:
//! validated endpoint, classified credential and the network's chain id and
//! gas parameters. Signing and broadcasting belong to the provider itself.

pub mod credential;
pub mod resolver;

pub use credential::{Credential, CredentialKind};
pub use resolver::{Endpoint, ProviderBinding, resolve_api_key, resolve_network};
