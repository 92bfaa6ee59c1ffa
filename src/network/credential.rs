//! Deployer credentials
//!
//! HD-wallet providers accept either a BIP-39 mnemonic or a raw private key
//! in the same slot. We classify the secret up front so a typo surfaces as a
//! configuration error instead of a provider failure mid-deployment.

use crate::util::SecretString;
use serde::Serialize;
use std::fmt;

/// Word counts allowed by BIP-39
const MNEMONIC_WORD_COUNTS: &[usize] = &[12, 15, 18, 21, 24];

/// Length of a secp256k1 private key in hex digits
const PRIVATE_KEY_HEX_LEN: usize = 64;

/// Kind of signing secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    Mnemonic,
    PrivateKey,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::Mnemonic => f.write_str("mnemonic"),
            CredentialKind::PrivateKey => f.write_str("private key"),
        }
    }
}

/// A classified deployer secret
///
/// Formatting and serialization never include the secret itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    kind: CredentialKind,
    secret: SecretString,
}

impl Credential {
    /// Classify a raw secret.
    ///
    /// The stored secret is normalized: surrounding whitespace is dropped and
    /// mnemonic words are joined by single spaces. The error string describes
    /// the problem without quoting the input.
    pub fn classify(secret: SecretString) -> Result<Self, String> {
        let raw = secret.expose_secret().trim();

        if looks_like_private_key(raw) {
            return Ok(Self {
                kind: CredentialKind::PrivateKey,
                secret: SecretString::new(raw),
            });
        }

        let words: Vec<&str> = raw.split_whitespace().collect();
        if words.len() > 1 {
            if !MNEMONIC_WORD_COUNTS.contains(&words.len()) {
                return Err(format!(
                    "mnemonic has {} words, expected one of 12, 15, 18, 21 or 24",
                    words.len()
                ));
            }
            if !words
                .iter()
                .all(|w| w.chars().all(|c| c.is_ascii_lowercase()))
            {
                return Err("mnemonic words must be lowercase ASCII letters".to_string());
            }
            return Ok(Self {
                kind: CredentialKind::Mnemonic,
                secret: SecretString::new(words.join(" ")),
            });
        }

        if raw.trim_start_matches("0x").chars().all(|c| c.is_ascii_hexdigit()) {
            Err(format!(
                "private key must be {} hex digits",
                PRIVATE_KEY_HEX_LEN
            ))
        } else {
            Err("expected a mnemonic phrase or a hex private key".to_string())
        }
    }

    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    /// The secret, for handing to a wallet provider.
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }
}

fn looks_like_private_key(raw: &str) -> bool {
    let hex = raw.strip_prefix("0x").unwrap_or(raw);
    hex.len() == PRIVATE_KEY_HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit())
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("secret", &self.secret)
            .finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.secret)
    }
}

impl Serialize for Credential {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Credential", 2)?;
        s.serialize_field("kind", &self.kind)?;
        s.serialize_field("secret", &self.secret)?;
        s.end()
    }
}
