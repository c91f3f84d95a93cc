//! Identifier types shared by the registry, cache, and interpreter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DeployError;

/// Length of a rendered address: `0x` plus 40 hex characters.
pub const ADDRESS_LEN: usize = 42;

/// User-chosen identifier for one contract within a run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A 20-byte on-chain address kept in its `0x`-prefixed hex rendering.
///
/// Construction validates the shape only; the original casing is preserved
/// so checksummed addresses round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == ADDRESS_LEN
            && (s.starts_with("0x") || s.starts_with("0X"))
            && s[2..].chars().all(|c| c.is_ascii_hexdigit());
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(DeployError::InvalidAddress(s.to_string()))
        }
    }
}

impl TryFrom<String> for Address {
    type Error = DeployError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A `path:Name` reference to a contract's source file and contract name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    raw: String,
    split: usize,
}

impl Locator {
    /// The full `path:Name` string, used as the signature-table key.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn source_path(&self) -> &str {
        &self.raw[..self.split]
    }

    pub fn contract_name(&self) -> &str {
        &self.raw[self.split + 1..]
    }
}

impl FromStr for Locator {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(':') {
            Some((path, name)) if !path.is_empty() && !name.is_empty() => Ok(Self {
                raw: s.to_string(),
                split: path.len(),
            }),
            _ => Err(DeployError::InvalidLocator(s.to_string())),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
