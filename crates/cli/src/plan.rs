//! Plan files: the contracts to register and the action script to run.

use std::path::Path;

use anyhow::Context;
use deployer_core::{Action, ContractSpec};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub contracts: Vec<ContractSpec>,
    pub actions: Vec<Action>,
}

impl Plan {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read(path)
            .with_context(|| format!("failed to read plan file {}", path.display()))?;
        serde_json::from_slice(&content)
            .with_context(|| format!("invalid plan file {}", path.display()))
    }
}
