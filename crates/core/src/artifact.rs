//! Build-artifact lookup and canonical function-signature extraction.
//!
//! Artifacts are the JSON files a build step writes per contract, at
//! `<artifact_dir>/<Source.sol>/<Name>.json`. Only the `abi` array is read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DeployError, Result};
use crate::types::Locator;

/// Function name to canonical `name(type,...)` signature.
pub type SignatureTable = BTreeMap<String, String>;

#[derive(Debug, Deserialize)]
struct Artifact {
    abi: Option<Vec<AbiEntry>>,
}

#[derive(Debug, Deserialize)]
struct AbiEntry {
    #[serde(rename = "type")]
    kind: String,
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<AbiParam>,
}

#[derive(Debug, Deserialize)]
struct AbiParam {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<AbiParam>,
}

impl AbiParam {
    /// Canonical type string; tuples expand to their component list.
    fn canonical(&self) -> String {
        match self.ty.strip_prefix("tuple") {
            Some(array_suffix) => {
                let inner: Vec<String> = self.components.iter().map(Self::canonical).collect();
                format!("({}){array_suffix}", inner.join(","))
            }
            None => self.ty.clone(),
        }
    }
}

/// Locates and parses build artifacts below a fixed output root.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    source_suffix: String,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>, source_suffix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            source_suffix: source_suffix.into(),
        }
    }

    /// Path of the artifact for `locator`: the first path segment ending in
    /// the source suffix, joined with `<Name>.json`.
    pub fn artifact_path(&self, locator: &Locator) -> Result<PathBuf> {
        let segment = locator
            .source_path()
            .split('/')
            .find(|chunk| chunk.ends_with(&self.source_suffix))
            .ok_or_else(|| DeployError::ArtifactNotFound {
                locator: locator.to_string(),
                reason: format!("no path segment ends in `{}`", self.source_suffix),
            })?;

        Ok(self
            .root
            .join(segment)
            .join(format!("{}.json", locator.contract_name())))
    }

    /// Load the artifact for `locator` and build its signature table.
    pub fn load_signatures(&self, locator: &Locator) -> Result<SignatureTable> {
        let path = self.artifact_path(locator)?;
        let content = std::fs::read(&path).map_err(|e| DeployError::ArtifactNotFound {
            locator: locator.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        parse_signatures(&path, &content)
    }
}

/// Build a signature table from raw artifact JSON.
///
/// Later declarations of an overloaded name replace earlier ones.
pub fn parse_signatures(path: &Path, content: &[u8]) -> Result<SignatureTable> {
    let malformed = |reason: String| DeployError::MalformedArtifact {
        path: path.to_path_buf(),
        reason,
    };

    let artifact: Artifact = serde_json::from_slice(content).map_err(|e| malformed(e.to_string()))?;
    let abi = artifact
        .abi
        .ok_or_else(|| malformed("missing `abi` array".to_string()))?;

    let mut signatures = SignatureTable::new();
    for entry in abi.into_iter().filter(|e| e.kind == "function") {
        let name = entry
            .name
            .ok_or_else(|| malformed("function entry without a name".to_string()))?;
        let inputs: Vec<String> = entry.inputs.iter().map(AbiParam::canonical).collect();
        let signature = format!("{name}({})", inputs.join(","));
        signatures.insert(name, signature);
    }
    Ok(signatures)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
