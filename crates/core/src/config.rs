//! Immutable run configuration.

use std::path::PathBuf;

/// Default directory for cache snapshots.
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Default root of the build-artifact tree.
pub const DEFAULT_ARTIFACT_DIR: &str = "out";

/// Suffix of the path segment that names an artifact subdirectory.
pub const DEFAULT_ARTIFACT_SUFFIX: &str = ".sol";

pub const DEFAULT_DEPLOY_TOOL: &str = "forge create";
pub const DEFAULT_SEND_TOOL: &str = "cast send";

/// Marker preceding the deployed address in the deploy tool's output.
pub const DEFAULT_ADDRESS_MARKER: &str = "Deployed to: ";

const LEGACY_FLAG: &str = "--legacy";
const RPC_FLAG: &str = "--rpc-url";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Network endpoint; also the cache namespace.
    pub rpc_url: String,
    /// Send pre-EIP-1559 transactions.
    pub legacy: bool,
    /// Echo every command and its output.
    pub debug: bool,
    pub cache_dir: PathBuf,
    pub artifact_dir: PathBuf,
    pub artifact_suffix: String,
    pub deploy_tool: String,
    pub send_tool: String,
    pub address_marker: String,
}

impl DeployConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            legacy: false,
            debug: false,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            artifact_suffix: DEFAULT_ARTIFACT_SUFFIX.to_string(),
            deploy_tool: DEFAULT_DEPLOY_TOOL.to_string(),
            send_tool: DEFAULT_SEND_TOOL.to_string(),
            address_marker: DEFAULT_ADDRESS_MARKER.to_string(),
        }
    }

    pub fn with_legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    pub fn with_tools(mut self, deploy_tool: impl Into<String>, send_tool: impl Into<String>) -> Self {
        self.deploy_tool = deploy_tool.into();
        self.send_tool = send_tool.into();
        self
    }

    /// Network flags shared by deploy and send invocations.
    pub(crate) fn network_args(&self) -> Vec<String> {
        let mut args = vec![RPC_FLAG.to_string(), self.rpc_url.clone()];
        if self.legacy {
            args.push(LEGACY_FLAG.to_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DeployConfig::new("http://localhost:8545");
        assert!(!config.legacy);
        assert!(!config.debug);
        assert_eq!(config.cache_dir, PathBuf::from("cache"));
        assert_eq!(config.artifact_dir, PathBuf::from("out"));
        assert_eq!(config.deploy_tool, "forge create");
        assert_eq!(config.send_tool, "cast send");
    }

    #[test]
    fn tools_can_be_replaced() {
        let config = DeployConfig::new("http://x").with_tools("./bin/create", "./bin/send");
        assert_eq!(config.deploy_tool, "./bin/create");
        assert_eq!(config.send_tool, "./bin/send");
    }

    #[test]
    fn legacy_flag_follows_endpoint() {
        let config = DeployConfig::new("http://localhost:8545").with_legacy(true);
        assert_eq!(
            config.network_args(),
            vec!["--rpc-url", "http://localhost:8545", "--legacy"]
        );
        assert_eq!(
            DeployConfig::new("http://x").network_args(),
            vec!["--rpc-url", "http://x"]
        );
    }
}
