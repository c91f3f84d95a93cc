//! Substitution of symbolic argument tokens.
//!
//! `$LABEL` becomes the resolved address of `LABEL`; `#PUB` becomes the
//! signer's public key; anything else passes through unchanged. Resolution
//! reads the registry every time since addresses fill in during a run.

use crate::error::{DeployError, Result};
use crate::registry::Registry;
use crate::signer::Signer;
use crate::types::Label;

/// Prefix marking a reference to another contract's address.
pub const ADDRESS_REF_PREFIX: &str = "$";

/// Prefix marking a reference to the signer's public key.
pub const PUBLIC_KEY_REF_PREFIX: &str = "#PUB";

pub struct ArgumentResolver<'a> {
    registry: &'a Registry,
    signer: &'a dyn Signer,
}

impl<'a> ArgumentResolver<'a> {
    pub fn new(registry: &'a Registry, signer: &'a dyn Signer) -> Self {
        Self { registry, signer }
    }

    pub fn resolve(&self, token: &str) -> Result<String> {
        if let Some(label) = token.strip_prefix(ADDRESS_REF_PREFIX) {
            let label = Label::new(label);
            return match self.registry.addresses().get(&label) {
                Some(address) => Ok(address.to_string()),
                None => Err(DeployError::UnknownContractLabel(label)),
            };
        }
        if token.starts_with(PUBLIC_KEY_REF_PREFIX) {
            return Ok(self.signer.public_key().to_string());
        }
        Ok(token.to_string())
    }

    pub fn resolve_all<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<String>> {
        tokens.iter().map(|t| self.resolve(t.as_ref())).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
