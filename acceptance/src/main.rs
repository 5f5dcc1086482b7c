//! Acceptance Test Runner
//!
//! Runs a named scenario against a deployed stack:
//! - Reads endpoints and credentials from the environment (and a `.env` file)
//! - Builds and tears down the fixture each scenario needs
//! - Bounds each scenario body with a timeout, so teardown still runs

use clap::Parser;
use std::time::Duration;

use acceptance::{AcceptanceConfig, ScenarioResult, TestScenarios};

#[derive(Parser)]
#[command(name = "acceptance")]
#[command(about = "Acceptance tests for the context broker, QuantumLeap and Grafana stack")]
struct Args {
    /// Test scenario to run
    #[arg(long, default_value = "all")]
    scenario: String,

    /// Per-scenario timeout in seconds (overrides SCENARIO_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Enable verbose tracing output
    #[arg(long)]
    verbose: bool,

    /// Environment file to load before reading configuration
    #[arg(long)]
    env_file: Option<String>,
}

#[tokio::main]
async fn main() -> ScenarioResult {
    let args = Args::parse();

    if let Some(path) = &args.env_file {
        dotenv::from_filename(path)?;
    }

    shared::logging::init_tracing(Some(if args.verbose { "debug" } else { "info" }));

    tracing::info!("🧪 Starting acceptance test runner");
    let mut config = AcceptanceConfig::from_env()?;
    if let Some(secs) = args.timeout_secs {
        config.scenario_timeout = Duration::from_secs(secs);
        config.validate()?;
    }
    tracing::info!("Scenario: {}, Timeout: {:?}", args.scenario, config.scenario_timeout);
    tracing::info!(
        "🎯 Broker {}, Grafana {}, tenant {}, entity '{}'",
        config.broker_url,
        config.grafana_url,
        config.tenant,
        config.entity_id
    );

    let scenarios = TestScenarios::new(config);

    // Scenarios enforce their own timeout so their fixtures are torn down
    if let Err(e) = scenarios.run_scenario(&args.scenario).await {
        tracing::error!("❌ Test scenario '{}' failed: {}", args.scenario, e);
        return Err(e);
    }
    tracing::info!("✅ Test scenario '{}' completed successfully", args.scenario);

    tracing::info!("🏁 Acceptance testing completed");
    Ok(())
}
