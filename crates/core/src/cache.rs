//! Per-network persistence of registry state for resumable runs.
//!
//! Each endpoint gets its own file at `<cache_dir>/deploy_<fingerprint>`.
//! Saves go through a temporary sibling file and a rename so a crash mid-write
//! never leaves a truncated snapshot behind.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::artifact::SignatureTable;
use crate::error::{DeployError, Result};
use crate::hashing;
use crate::registry::Registry;
use crate::types::{Address, Label};

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// File name prefix for cache snapshots.
const CACHE_FILE_PREFIX: &str = "deploy_";

/// Serialized copy of the registry's three mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub version: u32,
    pub contracts: BTreeMap<Label, String>,
    pub addresses: BTreeMap<Label, Address>,
    pub signatures: BTreeMap<String, SignatureTable>,
}

impl From<&Registry> for CacheSnapshot {
    fn from(registry: &Registry) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            contracts: registry.contracts.clone(),
            addresses: registry.addresses.clone(),
            signatures: registry.signatures.clone(),
        }
    }
}

impl From<CacheSnapshot> for Registry {
    fn from(snapshot: CacheSnapshot) -> Self {
        Self {
            contracts: snapshot.contracts,
            addresses: snapshot.addresses,
            signatures: snapshot.signatures,
        }
    }
}

/// Reads and writes snapshots below a cache directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Snapshot path for a fingerprint.
    pub fn path_for(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{CACHE_FILE_PREFIX}{fingerprint}"))
    }

    /// Snapshot path for a network endpoint.
    pub fn path_for_endpoint(&self, endpoint: &str) -> PathBuf {
        self.path_for(&hashing::fingerprint(endpoint))
    }

    /// Restore the snapshot for `fingerprint`.
    ///
    /// `Ok(None)` means no cache exists yet and the run starts empty.
    pub fn load(&self, fingerprint: &str) -> Result<Option<CacheSnapshot>> {
        let path = self.path_for(fingerprint);
        let content = match std::fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot: CacheSnapshot =
            serde_json::from_slice(&content).map_err(|e| corrupt(&path, e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(corrupt(
                &path,
                format!(
                    "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                    snapshot.version
                ),
            ));
        }
        Ok(Some(snapshot))
    }

    /// Overwrite the snapshot for `fingerprint`.
    pub fn save(&self, fingerprint: &str, snapshot: &CacheSnapshot) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(fingerprint);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_vec_pretty(snapshot).map_err(|e| corrupt(&path, e.to_string()))?;
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &path)?;

        tracing::debug!(
            path = %path.display(),
            addresses = snapshot.addresses.len(),
            "Saved deployment cache",
        );
        Ok(path)
    }
}

fn corrupt(path: &Path, reason: String) -> DeployError {
    DeployError::CacheCorrupt {
        path: path.to_path_buf(),
        reason,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
