//! Build state registry CLI entry point.
//!
//! Binary name: `buildstate`
//!
//! Parses CLI arguments, loads the registry config, initializes tracing, then
//! dispatches to the command handler.

mod cli;

use clap::Parser;

use buildstate_core::config::load_registry_config;
use buildstate_observe::tracing_setup::{init_tracing, shutdown_tracing, TracingOptions};

use cli::simulate::SimulationPlan;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The subscriber format comes from the config file, so the config has to
    // be read before tracing is up.
    let config = load_registry_config(&cli.config).await;

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,buildstate=debug",
        _ => "trace",
    };

    init_tracing(&TracingOptions {
        default_filter: filter.to_string(),
        json: config.logging.json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    tracing::debug!(
        path = %cli.config.display(),
        max_age_secs = config.sweep.max_age_secs,
        interval_secs = config.sweep.interval_secs,
        sweep_enabled = config.sweep.enabled,
        "registry config loaded"
    );

    let result = match cli.command {
        Commands::Simulate {
            sessions,
            builds,
            chunks,
        } => {
            let plan = SimulationPlan {
                sessions,
                builds,
                chunks,
            };
            cli::simulate::simulate(plan, &config, cli.json).await
        }
        Commands::Config => cli::config::show_config(&config, &cli.config, cli.json),
    };

    shutdown_tracing();
    result
}
