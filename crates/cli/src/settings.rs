//! Environment-driven configuration for the `deployer` binary.

use std::path::PathBuf;

use anyhow::{bail, Context};
use deployer_core::{DeployConfig, KeystoreSigner, PrivateKeySigner, Signer};

/// Plan file used when neither an argument nor `DEPLOY_PLAN` is given.
pub const DEFAULT_PLAN_PATH: &str = "deploy.json";

/// Everything the binary needs, read once at startup.
pub struct Settings {
    pub config: DeployConfig,
    pub plan_path: PathBuf,
    pub signer: Box<dyn Signer>,
}

impl Settings {
    /// Build settings from a variable lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F, plan_arg: Option<String>) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup("DEPLOY_RPC_URL").context("DEPLOY_RPC_URL is required")?;

        let mut config = DeployConfig::new(rpc_url)
            .with_legacy(flag(&lookup, "DEPLOY_LEGACY")?)
            .with_debug(flag(&lookup, "DEPLOY_DEBUG")?);
        if let Some(dir) = lookup("DEPLOY_CACHE_DIR") {
            config = config.with_cache_dir(dir);
        }
        if let Some(dir) = lookup("DEPLOY_ARTIFACT_DIR") {
            config = config.with_artifact_dir(dir);
        }

        let plan_path = plan_arg
            .or_else(|| lookup("DEPLOY_PLAN"))
            .unwrap_or_else(|| DEFAULT_PLAN_PATH.to_string())
            .into();

        Ok(Self {
            config,
            plan_path,
            signer: signer(&lookup)?,
        })
    }

    pub fn from_env(plan_arg: Option<String>) -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), plan_arg)
    }
}

fn flag<F>(lookup: &F, key: &str) -> anyhow::Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("0") | Some("false") => Ok(false),
        Some("1") | Some("true") => Ok(true),
        Some(other) => bail!("{key} must be true or false, got `{other}`"),
    }
}

fn signer<F>(lookup: &F) -> anyhow::Result<Box<dyn Signer>>
where
    F: Fn(&str) -> Option<String>,
{
    let public_key = lookup("DEPLOY_PUBLIC_KEY").context("DEPLOY_PUBLIC_KEY is required")?;

    if let Some(private_key) = lookup("DEPLOY_PRIVATE_KEY") {
        return Ok(Box::new(PrivateKeySigner::new(public_key, private_key)));
    }
    if let Some(keystore) = lookup("DEPLOY_KEYSTORE") {
        let password = lookup("DEPLOY_KEYSTORE_PASSWORD");
        return Ok(Box::new(KeystoreSigner::new(public_key, keystore, password)));
    }
    bail!("set DEPLOY_PRIVATE_KEY or DEPLOY_KEYSTORE")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn minimal_private_key_settings() {
        let settings = Settings::from_lookup(
            lookup(&[
                ("DEPLOY_RPC_URL", "http://localhost:8545"),
                ("DEPLOY_PUBLIC_KEY", "0xabc"),
                ("DEPLOY_PRIVATE_KEY", "0xsecret"),
            ]),
            None,
        )
        .unwrap();

        assert_eq!(settings.config.rpc_url, "http://localhost:8545");
        assert!(!settings.config.legacy);
        assert_eq!(settings.plan_path, PathBuf::from(DEFAULT_PLAN_PATH));
        assert_eq!(settings.signer.credential_args(), vec!["--private-key", "0xsecret"]);
    }

    #[test]
    fn argument_overrides_plan_variable() {
        let settings = Settings::from_lookup(
            lookup(&[
                ("DEPLOY_RPC_URL", "http://x"),
                ("DEPLOY_PUBLIC_KEY", "0xabc"),
                ("DEPLOY_KEYSTORE", "keys/a.json"),
                ("DEPLOY_PLAN", "env.json"),
                ("DEPLOY_LEGACY", "TRUE"),
            ]),
            Some("arg.json".to_string()),
        )
        .unwrap();

        assert_eq!(settings.plan_path, PathBuf::from("arg.json"));
        assert!(settings.config.legacy);
        assert_eq!(settings.signer.credential_args(), vec!["--keystore", "keys/a.json"]);
    }

    #[test]
    fn missing_rpc_url_is_an_error() {
        let err = Settings::from_lookup(lookup(&[]), None).err().expect("error");
        assert!(err.to_string().contains("DEPLOY_RPC_URL"));
    }

    #[test]
    fn missing_credentials_is_an_error() {
        let result = Settings::from_lookup(
            lookup(&[("DEPLOY_RPC_URL", "http://x"), ("DEPLOY_PUBLIC_KEY", "0xabc")]),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn bad_flag_is_an_error() {
        let result = Settings::from_lookup(
            lookup(&[
                ("DEPLOY_RPC_URL", "http://x"),
                ("DEPLOY_PUBLIC_KEY", "0xabc"),
                ("DEPLOY_PRIVATE_KEY", "0xsecret"),
                ("DEPLOY_DEBUG", "maybe"),
            ]),
            None,
        );
        assert!(result.is_err());
    }
}
