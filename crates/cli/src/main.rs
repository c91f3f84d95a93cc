//! `deployer` -- runs a deployment plan against one network.
//!
//! Reads a JSON plan (contracts plus an action script), restores the cache
//! for the configured endpoint, and executes the script step by step with
//! `forge create` / `cast send`. Re-running after a failure resumes: deploys
//! with a cached address are skipped. Sends are not; wrap sends that already
//! went through in a `skip_start` / `skip_end` range before re-running.
//!
//! # Environment variables
//!
//! | Variable                   | Required | Default       | Description                          |
//! |----------------------------|----------|---------------|--------------------------------------|
//! | `DEPLOY_RPC_URL`           | yes      | --            | Network endpoint, also the cache key |
//! | `DEPLOY_PUBLIC_KEY`        | yes      | --            | Signer address, substituted for `#PUB` |
//! | `DEPLOY_PRIVATE_KEY`       | one of   | --            | Raw signing key                      |
//! | `DEPLOY_KEYSTORE`          | one of   | --            | Keystore file path                   |
//! | `DEPLOY_KEYSTORE_PASSWORD` | no       | --            | Keystore password                    |
//! | `DEPLOY_LEGACY`            | no       | `false`       | Pass `--legacy` to the tools         |
//! | `DEPLOY_DEBUG`             | no       | `false`       | Log every command and its output     |
//! | `DEPLOY_CACHE_DIR`         | no       | `cache`       | Cache snapshot directory             |
//! | `DEPLOY_ARTIFACT_DIR`      | no       | `out`         | Build artifact root                  |
//! | `DEPLOY_PLAN`              | no       | `deploy.json` | Plan file (first argument overrides) |

mod plan;
mod settings;

use deployer_core::runner::ProcessRunner;
use deployer_core::Deployer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plan::Plan;
use settings::Settings;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deployer=info,deployer_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %format!("{e:#}"), "Deployment aborted");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::from_env(std::env::args().nth(1))?;
    let plan = Plan::load(&settings.plan_path)?;

    tracing::info!(
        plan = %settings.plan_path.display(),
        contracts = plan.contracts.len(),
        actions = plan.actions.len(),
        "Loaded plan",
    );

    let mut deployer = Deployer::new(
        settings.config,
        settings.signer,
        ProcessRunner,
        &plan.contracts,
    )?;
    tracing::info!(cache = %deployer.cache_path().display(), "Using cache");

    let summary = deployer.execute(&plan.actions).await?;

    tracing::info!(
        deployed = summary.deployed,
        reused = summary.reused,
        sent = summary.sent,
        skipped = summary.skipped,
        "Deployment complete",
    );
    for (label, address) in &summary.addresses {
        println!("{label:<24} {address}");
    }
    Ok(())
}
