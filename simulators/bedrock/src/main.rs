#![warn(clippy::unwrap_used)]

mod comparator;
mod config;
mod network;
mod policy;
mod suites;

use anyhow::Context;
use itertools::Itertools;
use rpcsim::{run_suite, Simulation};
use tracing::{error, info};

use crate::config::Config;
use crate::suites::compare_eth::compare_eth_calls_suite;
use crate::suites::legacy_eth::legacy_eth_calls_suite;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    info!(
        networks = %config.networks.iter().map(|network| &network.name).join(", "),
        timeout = ?config.request_timeout,
        "Loaded configuration"
    );

    let sim = Simulation::from_env()
        .context("Invalid test pattern")?
        .with_request_timeout(config.request_timeout);

    run_suite(
        sim.clone(),
        vec![
            compare_eth_calls_suite(&config.networks),
            legacy_eth_calls_suite(&config.networks),
        ],
    )
    .await;

    let summary = sim.summary().await;
    if summary.success() {
        info!(passed = summary.passed, "All tests passed");
        return Ok(());
    }

    for failed in &summary.failed {
        error!(name = %failed.name, details = %failed.result.details, "Test failed");
    }
    error!(
        passed = summary.passed,
        failed = summary.failed.len(),
        "Failed tests: {}",
        summary.failed.iter().map(|outcome| &outcome.name).join(", ")
    );
    std::process::exit(1);
}
