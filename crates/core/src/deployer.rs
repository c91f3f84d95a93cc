//! The action-script interpreter.
//!
//! [`Deployer`] owns the registry for one run, walks an action script in
//! order, and shells out to the deploy and send tools one command at a time.
//! State is checkpointed to the per-network cache when the script finishes
//! and whenever the run aborts, so completed deploys survive a failure.
//!
//! Deploys are idempotent across runs: a label with a known address is never
//! deployed again. Sends carry no such protection; an operator resuming after
//! a failure must wrap sends that already went through in a skip range.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::artifact::ArtifactStore;
use crate::cache::{CacheSnapshot, CacheStore};
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::hashing;
use crate::registry::Registry;
use crate::resolver::ArgumentResolver;
use crate::runner::{CommandLine, CommandOutput, CommandRunner};
use crate::script::{Action, ContractSpec, ScriptState};
use crate::signer::Signer;
use crate::types::{Address, Label, ADDRESS_LEN};

const CONSTRUCTOR_ARGS_FLAG: &str = "--constructor-args";

/// Separates captured stdout from stderr in a failed command's output.
pub const STDERR_DIVIDER: &str = "\n--- stderr ---\n";

/// Result of a single deploy instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// The deploy tool ran and reported this address.
    Deployed(Address),
    /// An address was already known; nothing ran.
    Cached(Address),
}

impl DeployOutcome {
    pub fn address(&self) -> &Address {
        match self {
            Self::Deployed(address) | Self::Cached(address) => address,
        }
    }
}

/// What a completed script did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Every resolved address after the run.
    pub addresses: BTreeMap<Label, Address>,
    pub deployed: usize,
    pub reused: usize,
    pub sent: usize,
    /// Deploy and send instructions passed over inside skip ranges.
    pub skipped: usize,
}

pub struct Deployer<R> {
    config: DeployConfig,
    signer: Box<dyn Signer>,
    runner: R,
    registry: Registry,
    cache: CacheStore,
    fingerprint: String,
}

impl<R: CommandRunner> Deployer<R> {
    /// Restore the cache for the configured endpoint, then register
    /// `contracts` on top of it.
    pub fn new(
        config: DeployConfig,
        signer: impl Signer + 'static,
        runner: R,
        contracts: &[ContractSpec],
    ) -> Result<Self> {
        let cache = CacheStore::new(&config.cache_dir);
        let fingerprint = hashing::fingerprint(&config.rpc_url);
        let cache_path = cache.path_for(&fingerprint);

        tracing::info!(rpc_url = %config.rpc_url, "Preparing deployment");

        let mut registry = match cache.load(&fingerprint)? {
            Some(snapshot) => {
                tracing::info!(path = %cache_path.display(), "Loading cache");
                Registry::from(snapshot)
            }
            None => {
                tracing::warn!(path = %cache_path.display(), "No cache found, starting fresh");
                Registry::new()
            }
        };

        let artifacts = ArtifactStore::new(&config.artifact_dir, config.artifact_suffix.as_str());
        for spec in contracts {
            registry.register(
                spec.label.clone(),
                &spec.locator,
                spec.address.clone(),
                &artifacts,
            )?;
        }
        if config.debug {
            registry.log_state(true);
        }

        Ok(Self {
            config,
            signer: Box::new(signer),
            runner,
            registry,
            cache,
            fingerprint,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache.path_for(&self.fingerprint)
    }

    /// Persist the current registry to the cache.
    pub fn checkpoint(&self) -> Result<PathBuf> {
        self.cache
            .save(&self.fingerprint, &CacheSnapshot::from(&self.registry))
    }

    /// Run every instruction of `actions` in order.
    ///
    /// The first error aborts the run after a checkpoint.
    pub async fn execute(&mut self, actions: &[Action]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        if let Err(err) = self.execute_actions(actions, &mut summary).await {
            // Command failures have already checkpointed.
            if !matches!(err, DeployError::ExternalCommandFailed { .. }) {
                if let Err(save_err) = self.checkpoint() {
                    tracing::error!(error = %save_err, "Failed to save checkpoint");
                }
            }
            return Err(err);
        }

        let path = self.checkpoint()?;
        tracing::info!(path = %path.display(), "Deployment state saved");
        self.registry.log_state(false);

        summary.addresses = self.registry.addresses().clone();
        Ok(summary)
    }

    async fn execute_actions(&mut self, actions: &[Action], summary: &mut RunSummary) -> Result<()> {
        let mut state = ScriptState::default();

        for action in actions {
            state = state.next(action);
            match (state, action) {
                (_, Action::SkipStart | Action::SkipEnd) => {}
                (ScriptState::Skipping, Action::Deploy { label, .. } | Action::Send { label, .. }) => {
                    tracing::info!(label = %label, "Skipping instruction");
                    summary.skipped += 1;
                }
                (ScriptState::Active, Action::Deploy { label, args }) => {
                    match self.deploy(label, args).await? {
                        DeployOutcome::Deployed(_) => summary.deployed += 1,
                        DeployOutcome::Cached(_) => summary.reused += 1,
                    }
                }
                (ScriptState::Active, Action::Send { label, function, args }) => {
                    self.send(label, function, args).await?;
                    summary.sent += 1;
                }
            }
        }
        Ok(())
    }

    /// Deploy `label` unless an address is already known for it.
    pub async fn deploy(&mut self, label: &Label, args: &[String]) -> Result<DeployOutcome> {
        if let Some(address) = self.registry.addresses().get(label) {
            tracing::info!(label = %label, address = %address, "Skipping deployment, address cached");
            return Ok(DeployOutcome::Cached(address.clone()));
        }

        let locator = self.registry.locator(label)?.to_string();
        let resolved = ArgumentResolver::new(&self.registry, &*self.signer).resolve_all(args)?;
        let command = self.deploy_command(&locator, &resolved);

        tracing::info!(label = %label, locator = %locator, "Deploying");
        let output = self.run_command(&command).await?;

        let address = parse_deployed_address(&output.stdout, &self.config.address_marker).ok_or_else(
            || DeployError::AddressParseFailure {
                label: label.clone(),
                output: output.stdout.clone(),
            },
        )?;

        tracing::info!(label = %label, address = %address, "Deployed");
        self.registry.set_address(label.clone(), address.clone());
        Ok(DeployOutcome::Deployed(address))
    }

    /// Call `function` on the already-deployed `label`.
    pub async fn send(&self, label: &Label, function: &str, args: &[String]) -> Result<()> {
        let address = self.registry.resolve_address(label)?;
        let locator = self.registry.locator(label)?;
        let signature = self.registry.signature_for(locator, function)?;
        let resolved = ArgumentResolver::new(&self.registry, &*self.signer).resolve_all(args)?;
        let command = self.send_command(address, signature, &resolved);

        tracing::info!(label = %label, function, "Sending");
        self.run_command(&command).await?;
        Ok(())
    }

    fn deploy_command(&self, locator: &str, args: &[String]) -> CommandLine {
        CommandLine::new(&self.config.deploy_tool)
            .args(self.config.network_args())
            .args(self.signer.credential_args())
            .arg(locator)
            .args(
                args.iter()
                    .flat_map(|arg| [CONSTRUCTOR_ARGS_FLAG.to_string(), arg.clone()]),
            )
    }

    fn send_command(&self, address: &Address, signature: &str, args: &[String]) -> CommandLine {
        CommandLine::new(&self.config.send_tool)
            .arg(address.as_str())
            .args(self.config.network_args())
            .args(self.signer.credential_args())
            .arg(format!("\"{signature}\""))
            .args(args.iter().cloned())
    }

    /// Run `command`; a non-zero exit checkpoints and aborts the run.
    async fn run_command(&self, command: &CommandLine) -> Result<CommandOutput> {
        let output = self.runner.run(command).await?;

        if self.config.debug {
            tracing::info!(
                command = %command,
                exit_code = output.exit_code,
                duration_ms = output.duration_ms,
                stdout = %output.stdout,
                "Command finished",
            );
        }

        if !output.success() {
            if let Err(save_err) = self.checkpoint() {
                tracing::error!(error = %save_err, "Failed to save checkpoint");
            }
            tracing::error!(
                command = %command,
                exit_code = output.exit_code,
                stdout = %output.stdout,
                stderr = %output.stderr,
                "Command failed",
            );
            self.registry.log_state(false);

            return Err(DeployError::ExternalCommandFailed {
                command: command.redacted(),
                exit_code: output.exit_code,
                output: format!("{}{STDERR_DIVIDER}{}", output.stdout, output.stderr),
            });
        }
        Ok(output)
    }
}

/// Extract the deployed address from deploy-tool output: the trailing
/// 42 characters of the first line containing `marker`.
pub fn parse_deployed_address(output: &str, marker: &str) -> Option<Address> {
    let line = output.lines().find(|line| line.contains(marker))?.trim_end();
    let start = line.len().checked_sub(ADDRESS_LEN)?;
    line.get(start..)?.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ADDRESS_MARKER;

    const FORGE_OUTPUT: &str = "\
[⠊] Compiling...
No files changed, compilation skipped
Deployer: 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266
Deployed to: 0x5FbDB2315678afecb367f032d93F642f64180aa3
Transaction hash: 0x3b2c0f7f2f1d
";

    #[test]
    fn parses_address_after_marker() {
        let address = parse_deployed_address(FORGE_OUTPUT, DEFAULT_ADDRESS_MARKER).unwrap();
        assert_eq!(address.as_str(), "0x5FbDB2315678afecb367f032d93F642f64180aa3");
    }

    #[test]
    fn tolerates_trailing_whitespace_and_crlf() {
        let output = "Deployed to: 0x5FbDB2315678afecb367f032d93F642f64180aa3  \r\n";
        assert!(parse_deployed_address(output, DEFAULT_ADDRESS_MARKER).is_some());
    }

    #[test]
    fn missing_marker_yields_none() {
        assert!(parse_deployed_address("Error: insufficient funds", DEFAULT_ADDRESS_MARKER).is_none());
    }

    #[test]
    fn short_or_invalid_trailer_yields_none() {
        assert!(parse_deployed_address("Deployed to: 0x1234", DEFAULT_ADDRESS_MARKER).is_none());
        assert!(parse_deployed_address(
            "Deployed to: 0x5FbDB2315678afecb367f032d93F642f64180aaZ",
            DEFAULT_ADDRESS_MARKER
        )
        .is_none());
    }

    #[test]
    fn outcome_exposes_address() {
        let address: Address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap();
        assert_eq!(DeployOutcome::Cached(address.clone()).address(), &address);
        assert_eq!(DeployOutcome::Deployed(address.clone()).address(), &address);
    }
}
