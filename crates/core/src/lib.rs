//! Resumable contract deployment orchestration.
//!
//! A [`Deployer`] walks an action script of deploy, send, and skip
//! instructions, shelling out to an external deploy/broadcast toolchain for
//! each step and persisting resolved addresses to a per-network cache so an
//! interrupted run picks up where it stopped.

pub mod artifact;
pub mod cache;
pub mod config;
pub mod deployer;
pub mod error;
pub mod hashing;
pub mod registry;
pub mod resolver;
pub mod runner;
pub mod script;
pub mod signer;
pub mod types;

pub use config::DeployConfig;
pub use deployer::{DeployOutcome, Deployer, RunSummary};
pub use error::{DeployError, Result};
pub use script::{Action, ContractSpec};
pub use signer::{KeystoreSigner, PrivateKeySigner, Signer};
pub use types::{Address, Label};
