use std::path::PathBuf;

use crate::types::Label;

/// Every failure the deployment engine can surface.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Invalid contract locator `{0}`, expected `path:Name`")]
    InvalidLocator(String),

    #[error("Invalid address `{0}`, expected 0x followed by 40 hex characters")]
    InvalidAddress(String),

    #[error("Build artifact not found for `{locator}`: {reason}")]
    ArtifactNotFound { locator: String, reason: String },

    #[error("Malformed build artifact {}: {reason}", .path.display())]
    MalformedArtifact { path: PathBuf, reason: String },

    #[error("Function `{function}` does not exist in `{locator}`")]
    UnknownFunction { function: String, locator: String },

    #[error("Contract `{0}` has no known address to reference")]
    UnknownContractLabel(Label),

    #[error("Contract `{0}` has no resolved address, deploy it first")]
    UnresolvedAddress(Label),

    #[error("Contract `{0}` is not registered with a locator")]
    UnregisteredContract(Label),

    #[error("Could not parse a deployed address for `{label}` from tool output")]
    AddressParseFailure { label: Label, output: String },

    #[error("External command failed (exit code {exit_code}): {command}")]
    ExternalCommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("Cache file {} is unusable: {reason}", .path.display())]
    CacheCorrupt { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeployError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_function() {
        let err = DeployError::UnknownFunction {
            function: "mint".to_string(),
            locator: "src/Token.sol:Token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Function `mint` does not exist in `src/Token.sol:Token`"
        );
    }

    #[test]
    fn display_command_failed_includes_exit_code() {
        let err = DeployError::ExternalCommandFailed {
            command: "cast send 0x01".to_string(),
            exit_code: 2,
            output: String::new(),
        };
        assert!(err.to_string().contains("exit code 2"));
        assert!(err.to_string().ends_with("cast send 0x01"));
    }

    #[test]
    fn io_error_converts() {
        let inner = std::io::Error::other("disk gone");
        let err: DeployError = inner.into();
        assert!(err.to_string().starts_with("I/O error:"));
    }
}
