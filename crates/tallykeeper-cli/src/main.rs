//! Tallykeeper - simulated device running the housekeeping scheduler.

use anyhow::Context;
use clap::Parser;
use tallykeeper_cli::{init_logging, load_config, Cli, Simulation};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli).context("failed to load configuration")?;
    init_logging(config.verbose)?;

    let summary = Simulation::new(config, &cli)
        .run()
        .await
        .context("simulation failed")?;

    println!(
        "{} boots, {} cycles, {} low-memory events, {} restarts",
        summary.boots, summary.cycles, summary.low_memory_events, summary.restarts
    );

    Ok(())
}
